//! Validated metric input.

use burn::tensor::{backend::Backend, Tensor};

use crate::error::{MetricError, MetricResult};

/// A prediction paired with its ground truth, both `[height, width]`.
///
/// Construction checks the shapes once so individual metrics can skip it.
/// Values are expected to lie in [0, 1]; this is not checked.
#[derive(Debug, Clone)]
pub struct MetricInput<B: Backend> {
    /// Predicted alpha.
    pub pred: Tensor<B, 2>,
    /// Ground-truth alpha.
    pub gt: Tensor<B, 2>,
}

impl<B: Backend> MetricInput<B> {
    /// Pair `pred` with `gt`, failing with [`MetricError::ShapeMismatch`] when
    /// their dimensions differ.
    pub fn try_new(pred: Tensor<B, 2>, gt: Tensor<B, 2>) -> MetricResult<Self> {
        let (pred_dims, gt_dims) = (pred.dims(), gt.dims());
        if pred_dims != gt_dims {
            return Err(MetricError::ShapeMismatch {
                pred: pred_dims,
                gt: gt_dims,
            });
        }
        Ok(Self { pred, gt })
    }

    pub fn dims(&self) -> [usize; 2] {
        self.pred.dims()
    }

    pub fn num_pixels(&self) -> usize {
        let [height, width] = self.dims();
        height * width
    }
}
