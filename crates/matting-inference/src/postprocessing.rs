//! Post-processing of predicted alpha mattes into binary masks.
//!
//! A prediction is binarized with [`apply_threshold`] and then grown with an
//! elliptical dilation so the mask errs on the side of covering the subject.

use burn::{
    config::Config,
    tensor::{backend::Backend, Tensor},
};
use matting_util::dilate_mask;

use crate::error::{InferenceError, InferenceResult};

/// Threshold and dilation applied to every predicted matte.
#[derive(Config, Debug)]
pub struct MaskRefinementConfig {
    /// Alpha cutoff in [0, 1], compared on the 8-bit scale.
    #[config(default = 0.05)]
    pub threshold: f64,
    /// Side length of the elliptical structuring element; 0 or 1 disables dilation.
    #[config(default = 20)]
    pub radius: usize,
}

impl MaskRefinementConfig {
    /// # Errors
    /// [`InferenceError::InvalidThreshold`] unless `threshold` is in [0, 1].
    pub fn validate(&self) -> InferenceResult<()> {
        if (0.0..=1.0).contains(&self.threshold) {
            Ok(())
        } else {
            Err(InferenceError::InvalidThreshold(self.threshold))
        }
    }

    /// Threshold then dilate `alpha`.
    pub fn refine<B: Backend>(&self, alpha: Tensor<B, 2>) -> Tensor<B, 2> {
        refine_alpha(alpha, self.threshold, self.radius)
    }
}

/// Binarize an alpha matte on the 8-bit scale.
///
/// A pixel is foreground (1.0) when `trunc(alpha * 255) >= threshold * 255`
/// and background (0.0) otherwise. `threshold = 0` keeps every pixel and
/// `threshold = 1` keeps only pixels with alpha exactly 1.
///
/// # Arguments
/// * `alpha` - Alpha matte `[height, width]` with values in [0, 1]
/// * `threshold` - Cutoff in [0, 1]
///
/// # Returns
/// Binary mask with values in {0, 1}
pub fn apply_threshold<B: Backend>(alpha: Tensor<B, 2>, threshold: f64) -> Tensor<B, 2> {
    // u8 values are integers, so `>= t` is `>= ceil(t)`
    let cutoff = (threshold * 255.0).ceil();
    alpha
        .mul_scalar(255.0)
        .floor()
        .greater_equal_elem(cutoff)
        .float()
}

/// Threshold `alpha` then dilate it with a `radius x radius` ellipse.
pub fn refine_alpha<B: Backend>(
    alpha: Tensor<B, 2>,
    threshold: f64,
    radius: usize,
) -> Tensor<B, 2> {
    let mask = apply_threshold(alpha, threshold);
    dilate_mask(mask, radius)
}

#[cfg(test)]
mod tests {
    use burn::backend::NdArray;
    use matting_util::{tensor_from_vec, tensor_to_vec};
    use rstest::*;

    use super::*;

    type TestBackend = NdArray;

    fn alpha(values: Vec<f32>) -> Tensor<TestBackend, 2> {
        let len = values.len();
        tensor_from_vec(values, [1, len], &Default::default())
    }

    #[rstest]
    #[case(0.0, vec![1.0, 1.0, 1.0, 1.0, 1.0])]
    #[case(1.0, vec![0.0, 0.0, 0.0, 0.0, 1.0])]
    #[case(0.5, vec![0.0, 0.0, 0.0, 1.0, 1.0])]
    #[case(0.05, vec![0.0, 0.0, 1.0, 1.0, 1.0])]
    fn threshold_on_8bit_scale(#[case] threshold: f64, #[case] expected: Vec<f32>) {
        let input = alpha(vec![0.0, 0.05, 0.5, 0.999, 1.0]);

        assert_eq!(tensor_to_vec(apply_threshold(input, threshold)), expected);
    }

    #[test]
    fn threshold_truncates_like_u8_conversion() {
        // 0.05 * 255 = 12.75, so the cutoff is 13: 12.9 / 255 truncates to 12.
        let input = alpha(vec![12.9 / 255.0, 12.99995 / 255.0, 13.5 / 255.0]);

        assert_eq!(
            tensor_to_vec(apply_threshold(input, 0.05)),
            vec![0.0, 0.0, 1.0]
        );
    }

    #[test]
    fn full_threshold_keeps_only_exact_ones() {
        let input = alpha(vec![1.0 - f32::EPSILON / 2.0, 1.0]);

        assert_eq!(tensor_to_vec(apply_threshold(input, 1.0)), vec![0.0, 1.0]);
    }

    #[test]
    fn quantized_levels_match_u8_truncation() {
        let levels: Vec<f32> = (0..=255).map(|v| v as f32 / 255.0).collect();
        let mask = tensor_to_vec(apply_threshold(alpha(levels.clone()), 0.5));

        // ceil(127.5) = 128
        for (level, m) in levels.iter().zip(&mask) {
            let as_u8 = (level * 255.0) as u8;
            assert_eq!(*m, if as_u8 >= 128 { 1.0 } else { 0.0 }, "alpha {level}");
        }
        assert_eq!(mask[0], 0.0);
        assert_eq!(mask[255], 1.0);
    }

    #[rstest]
    #[case(0.0, true)]
    #[case(1.0, true)]
    #[case(-0.1, false)]
    #[case(1.5, false)]
    fn validate_threshold_range(#[case] threshold: f64, #[case] ok: bool) {
        let config = MaskRefinementConfig::new().with_threshold(threshold);

        assert_eq!(config.validate().is_ok(), ok);
    }

    #[test]
    fn refine_thresholds_then_dilates() {
        let mut values = vec![0.0; 100];
        values[4 * 10 + 5] = 0.8;
        values[0] = 0.01;
        let input = tensor_from_vec::<TestBackend>(values, [10, 10], &Default::default());

        let config = MaskRefinementConfig::new().with_radius(3);
        let mask = tensor_to_vec(config.refine(input));

        let foreground: Vec<usize> = (0..100).filter(|&i| mask[i] == 1.0).collect();
        assert_eq!(foreground, vec![35, 44, 45, 46, 55]);
    }

    #[test]
    fn default_config() {
        let config = MaskRefinementConfig::new();

        assert_eq!(config.threshold, 0.05);
        assert_eq!(config.radius, 20);
        assert!(config.validate().is_ok());
    }
}
