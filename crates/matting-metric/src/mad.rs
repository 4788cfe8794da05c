//! Mean absolute difference between two alpha mattes.

use burn::tensor::{backend::Backend, ElementConversion, Tensor};

use crate::{error::MetricResult, input::MetricInput};

/// `mean(|pred - gt|)`
///
/// # Errors
/// [`MetricError::ShapeMismatch`](crate::MetricError::ShapeMismatch) when the
/// inputs differ in size.
pub fn calculate_mad<B: Backend>(pred: Tensor<B, 2>, gt: Tensor<B, 2>) -> MetricResult<f64> {
    Ok(mad(&MetricInput::try_new(pred, gt)?))
}

pub(crate) fn mad<B: Backend>(input: &MetricInput<B>) -> f64 {
    (input.pred.clone() - input.gt.clone())
        .abs()
        .mean()
        .into_scalar()
        .elem::<f64>()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use burn::backend::NdArray;
    use matting_util::tensor_from_vec;
    use rstest::*;

    use super::*;
    use crate::MetricError;

    type TestBackend = NdArray;

    #[rstest]
    #[case(vec![0.0, 0.0, 0.0, 0.0], vec![0.0, 0.0, 0.0, 0.0], 0.0)]
    #[case(vec![1.0, 0.0, 0.0, 0.0], vec![0.0, 0.0, 0.0, 0.0], 0.25)]
    #[case(vec![0.5, 0.5, 0.5, 0.5], vec![0.0, 1.0, 0.25, 0.75], 0.375)]
    fn mad_values(#[case] pred: Vec<f32>, #[case] gt: Vec<f32>, #[case] expected: f64) {
        let device = Default::default();
        let pred = tensor_from_vec::<TestBackend>(pred, [2, 2], &device);
        let gt = tensor_from_vec::<TestBackend>(gt, [2, 2], &device);

        assert_relative_eq!(calculate_mad(pred, gt).unwrap(), expected, epsilon = 1e-6);
    }

    #[test]
    fn mad_is_symmetric() {
        let device = Default::default();
        let a = tensor_from_vec::<TestBackend>(vec![0.1, 0.9, 0.3, 0.0], [2, 2], &device);
        let b = tensor_from_vec::<TestBackend>(vec![0.6, 0.2, 0.3, 1.0], [2, 2], &device);

        let ab = calculate_mad(a.clone(), b.clone()).unwrap();
        let ba = calculate_mad(b, a).unwrap();
        assert_relative_eq!(ab, ba, epsilon = 1e-9);
    }

    #[test]
    fn mad_rejects_shape_mismatch() {
        let device = Default::default();
        let pred = Tensor::<TestBackend, 2>::zeros([2, 3], &device);
        let gt = Tensor::<TestBackend, 2>::zeros([3, 2], &device);

        assert!(matches!(
            calculate_mad(pred, gt),
            Err(MetricError::ShapeMismatch { .. })
        ));
    }
}
