//! Gradient error
//!
//! Compares the Gaussian-derivative gradient magnitude of the two mattes after
//! min-max normalization. Sharp or missing edges in the prediction show up here
//! even when the per-pixel error is small.

use burn::{
    config::Config,
    tensor::{backend::Backend, ElementConversion, Tensor},
};
use matting_util::{gaussian_gradient_magnitude, min_max_normalize};

use crate::{error::MetricResult, input::MetricInput};

/// Parameters of the gradient error.
#[derive(Config, Debug)]
pub struct GradientConfig {
    /// Standard deviation of the derivative-of-Gaussian filter.
    #[config(default = 1.4)]
    pub sigma: f64,
    /// Gaussian tail level at which the kernel is truncated.
    #[config(default = 0.01)]
    pub epsilon: f64,
}

/// Gradient error with the default [`GradientConfig`].
pub fn calculate_grad<B: Backend>(pred: Tensor<B, 2>, gt: Tensor<B, 2>) -> MetricResult<f64> {
    Ok(grad(&MetricInput::try_new(pred, gt)?, &GradientConfig::new()))
}

/// Gradient error: `mean((|grad pred| - |grad gt|)^2)` on normalized inputs.
pub fn calculate_grad_with<B: Backend>(
    pred: Tensor<B, 2>,
    gt: Tensor<B, 2>,
    config: &GradientConfig,
) -> MetricResult<f64> {
    Ok(grad(&MetricInput::try_new(pred, gt)?, config))
}

pub(crate) fn grad<B: Backend>(input: &MetricInput<B>, config: &GradientConfig) -> f64 {
    if input.num_pixels() == 0 {
        return 0.0;
    }

    let pred_mag = gaussian_gradient_magnitude(
        min_max_normalize(input.pred.clone()),
        config.sigma,
        config.epsilon,
    );
    let gt_mag = gaussian_gradient_magnitude(
        min_max_normalize(input.gt.clone()),
        config.sigma,
        config.epsilon,
    );

    (pred_mag - gt_mag)
        .powf_scalar(2.0)
        .mean()
        .into_scalar()
        .elem::<f64>()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use burn::backend::NdArray;
    use matting_util::tensor_from_vec;

    use super::*;

    type TestBackend = NdArray;

    fn block(size: usize, from: usize, to: usize) -> Vec<f32> {
        (0..size * size)
            .map(|i| {
                let (y, x) = (i / size, i % size);
                if (from..to).contains(&y) && (from..to).contains(&x) {
                    1.0
                } else {
                    0.0
                }
            })
            .collect()
    }

    #[test]
    fn identical_mattes_have_zero_gradient_error() {
        let device = Default::default();
        let a = tensor_from_vec::<TestBackend>(block(12, 3, 8), [12, 12], &device);

        assert_relative_eq!(calculate_grad(a.clone(), a).unwrap(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn constant_inputs_normalize_to_zero() {
        let device = Default::default();
        let zeros = Tensor::<TestBackend, 2>::zeros([6, 6], &device);
        let ones = Tensor::<TestBackend, 2>::ones([6, 6], &device);

        // Both become all-zero after normalization.
        assert_relative_eq!(calculate_grad(zeros, ones).unwrap(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn missing_edge_is_penalized() {
        let device = Default::default();
        let gt = tensor_from_vec::<TestBackend>(block(12, 3, 8), [12, 12], &device);
        let empty = Tensor::<TestBackend, 2>::zeros([12, 12], &device);
        let close = tensor_from_vec::<TestBackend>(block(12, 3, 9), [12, 12], &device);

        let missing = calculate_grad(empty, gt.clone()).unwrap();
        let shifted = calculate_grad(close, gt).unwrap();
        assert!(missing > 0.0);
        assert!(shifted > 0.0);
        assert!(missing > shifted);
    }

    #[test]
    fn empty_mattes_have_zero_gradient_error() {
        let device = Default::default();
        let pred = Tensor::<TestBackend, 2>::zeros([0, 4], &device);
        let gt = Tensor::<TestBackend, 2>::zeros([0, 4], &device);

        assert_eq!(calculate_grad(pred, gt).unwrap(), 0.0);
    }

    #[test]
    fn default_config() {
        let config = GradientConfig::new();
        assert_eq!(config.sigma, 1.4);
        assert_eq!(config.epsilon, 0.01);
    }
}
