//! Mean squared error between two alpha mattes.

use burn::tensor::{backend::Backend, ElementConversion, Tensor};

use crate::{error::MetricResult, input::MetricInput};

/// `mean((pred - gt)^2)`
pub fn calculate_mse<B: Backend>(pred: Tensor<B, 2>, gt: Tensor<B, 2>) -> MetricResult<f64> {
    Ok(mse(&MetricInput::try_new(pred, gt)?))
}

pub(crate) fn mse<B: Backend>(input: &MetricInput<B>) -> f64 {
    (input.pred.clone() - input.gt.clone())
        .powf_scalar(2.0)
        .mean()
        .into_scalar()
        .elem::<f64>()
}
