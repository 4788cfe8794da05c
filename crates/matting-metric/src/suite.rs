//! All five matting metrics computed in one call.

use std::fmt;

use burn::{
    config::Config,
    tensor::{backend::Backend, Tensor},
};
use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::{
    conn::{conn, ConnectivityConfig},
    error::MetricResult,
    grad::{grad, GradientConfig},
    input::MetricInput,
    iou::{iou, IoUConfig},
    mad::mad,
    mse::mse,
};

/// Scores of one prediction, or the mean over many.
#[derive(new, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MatteMetrics {
    pub mad: f64,
    pub mse: f64,
    pub grad: f64,
    pub conn: f64,
    pub iou: f64,
}

impl fmt::Display for MatteMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MAD={:.5} MSE={:.5} GRAD={:.5} CONN={:.5} IoU={:.5}",
            self.mad, self.mse, self.grad, self.conn, self.iou
        )
    }
}

#[derive(Config, Debug)]
pub struct MetricSuiteConfig {
    #[config(default = "GradientConfig::new()")]
    pub gradient: GradientConfig,
    #[config(default = "ConnectivityConfig::new()")]
    pub connectivity: ConnectivityConfig,
    #[config(default = "IoUConfig::new()")]
    pub iou: IoUConfig,
}

impl MetricSuiteConfig {
    pub fn init(&self) -> MetricSuite {
        MetricSuite {
            config: self.clone(),
        }
    }
}

/// Computes every metric for a prediction/ground-truth pair.
#[derive(Debug, Clone)]
pub struct MetricSuite {
    config: MetricSuiteConfig,
}

impl Default for MetricSuite {
    fn default() -> Self {
        MetricSuiteConfig::new().init()
    }
}

impl MetricSuite {
    /// Validate the shapes once and compute all five metrics.
    ///
    /// # Errors
    /// [`MetricError::ShapeMismatch`](crate::MetricError::ShapeMismatch) when
    /// `pred` and `gt` differ in size; no metric is computed in that case.
    pub fn evaluate<B: Backend>(
        &self,
        pred: Tensor<B, 2>,
        gt: Tensor<B, 2>,
    ) -> MetricResult<MatteMetrics> {
        let input = MetricInput::try_new(pred, gt)?;

        Ok(MatteMetrics {
            mad: mad(&input),
            mse: mse(&input),
            grad: grad(&input, &self.config.gradient),
            conn: conn(&input, &self.config.connectivity),
            iou: iou(&input, &self.config.iou),
        })
    }
}
