//! Intersection over union of the binarized mattes.

use burn::{
    config::Config,
    tensor::{backend::Backend, ElementConversion, Tensor},
};

use crate::{error::MetricResult, input::MetricInput};

/// Parameters of the IoU metric.
#[derive(Config, Debug)]
pub struct IoUConfig {
    /// Alpha at or above this value is foreground.
    #[config(default = 0.5)]
    pub cutoff: f64,
}

/// IoU with the default [`IoUConfig`].
pub fn calculate_iou<B: Backend>(pred: Tensor<B, 2>, gt: Tensor<B, 2>) -> MetricResult<f64> {
    Ok(iou(&MetricInput::try_new(pred, gt)?, &IoUConfig::new()))
}

/// `|pred ∩ gt| / |pred ∪ gt|` after binarizing both at `config.cutoff`.
///
/// When neither matte has any foreground the union is empty and the result
/// is 1.0: two empty masks agree perfectly.
pub fn calculate_iou_with<B: Backend>(
    pred: Tensor<B, 2>,
    gt: Tensor<B, 2>,
    config: &IoUConfig,
) -> MetricResult<f64> {
    Ok(iou(&MetricInput::try_new(pred, gt)?, config))
}

pub(crate) fn iou<B: Backend>(input: &MetricInput<B>, config: &IoUConfig) -> f64 {
    let pred = input.pred.clone().greater_equal_elem(config.cutoff).float();
    let gt = input.gt.clone().greater_equal_elem(config.cutoff).float();

    let intersection = (pred.clone() * gt.clone()).sum().into_scalar().elem::<f64>();
    let union = (pred + gt).sum().into_scalar().elem::<f64>() - intersection;

    if union > 0.0 {
        intersection / union
    } else {
        1.0
    }
}
