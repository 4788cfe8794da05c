//! Connectivity error
//!
//! Thresholds both mattes at increasing levels and tracks, per pixel, the last
//! level at which it still belongs to the largest 4-connected region shared by
//! prediction and ground truth. Pixels whose alpha is far above that level
//! count as disconnected, and the error is the mean difference in
//! connectivity between the two mattes.

use burn::{
    config::Config,
    tensor::{backend::Backend, Tensor},
};
use matting_util::{label_components, tensor_to_vec};

use crate::{error::MetricResult, input::MetricInput};

/// Parameters of the connectivity error.
#[derive(Config, Debug)]
pub struct ConnectivityConfig {
    /// Distance between consecutive threshold levels.
    #[config(default = 0.1)]
    pub step: f64,
    /// Distances below this are treated as fully connected.
    #[config(default = 0.15)]
    pub distance_cutoff: f64,
}

impl ConnectivityConfig {
    /// Threshold levels `step, 2 * step, ..., 1`.
    fn levels(&self) -> Vec<f64> {
        let count = if self.step > 0.0 {
            (1.0 / self.step).round().max(1.0) as usize
        } else {
            1
        };
        (1..=count).map(|i| i as f64 / count as f64).collect()
    }
}

/// Connectivity error with the default [`ConnectivityConfig`].
pub fn calculate_conn<B: Backend>(pred: Tensor<B, 2>, gt: Tensor<B, 2>) -> MetricResult<f64> {
    Ok(conn(
        &MetricInput::try_new(pred, gt)?,
        &ConnectivityConfig::new(),
    ))
}

/// Connectivity error with an explicit configuration.
pub fn calculate_conn_with<B: Backend>(
    pred: Tensor<B, 2>,
    gt: Tensor<B, 2>,
    config: &ConnectivityConfig,
) -> MetricResult<f64> {
    Ok(conn(&MetricInput::try_new(pred, gt)?, config))
}

pub(crate) fn conn<B: Backend>(input: &MetricInput<B>, config: &ConnectivityConfig) -> f64 {
    let num_pixels = input.num_pixels();
    if num_pixels == 0 {
        return 0.0;
    }

    let pred = tensor_to_vec(input.pred.clone());
    let gt = tensor_to_vec(input.gt.clone());
    let [height, width] = input.dims();
    let levels = round_down_levels(&pred, &gt, height, width, &config.levels());

    let phi = |alpha: f32, level: f64| {
        let distance = f64::from(alpha) - level;
        if distance >= config.distance_cutoff {
            1.0 - distance
        } else {
            1.0
        }
    };

    let total: f64 = levels
        .iter()
        .zip(pred.iter().zip(&gt))
        .map(|(&level, (&p, &g))| (phi(g, level) - phi(p, level)).abs())
        .sum();

    total / num_pixels as f64
}

/// For each pixel, the level just before it first drops out of the largest
/// common component, or 1 if it never does.
fn round_down_levels(
    pred: &[f32],
    gt: &[f32],
    height: usize,
    width: usize,
    levels: &[f64],
) -> Vec<f64> {
    let mut round_down: Vec<Option<f64>> = vec![None; pred.len()];
    let mut previous = 0.0;

    for &level in levels {
        let foreground: Vec<bool> = pred
            .iter()
            .zip(gt)
            .map(|(&p, &g)| f64::from(p) >= level && f64::from(g) >= level)
            .collect();
        let components = label_components(&foreground, height, width);
        let largest = components.largest();

        for (slot, &label) in round_down.iter_mut().zip(&components.labels) {
            let in_largest = label != 0 && Some(label) == largest;
            if slot.is_none() && !in_largest {
                *slot = Some(previous);
            }
        }
        previous = level;
    }

    round_down.into_iter().map(|l| l.unwrap_or(1.0)).collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use burn::backend::NdArray;
    use matting_util::tensor_from_vec;
    use rstest::*;

    use super::*;

    type TestBackend = NdArray;

    #[test]
    fn levels_cover_unit_interval() {
        let levels = ConnectivityConfig::new().levels();

        assert_eq!(levels.len(), 10);
        assert_relative_eq!(levels[0], 0.1);
        assert_relative_eq!(levels[9], 1.0);
    }

    #[test]
    fn round_down_tracks_first_exit() {
        // Two separate foreground blobs; the left one is larger.
        let alpha = [
            1.0, 1.0, 0.0, 0.5, //
            1.0, 1.0, 0.0, 0.0,
        ];
        let levels = round_down_levels(&alpha, &alpha, 2, 4, &[0.25, 0.5, 0.75, 1.0]);

        // Background leaves at the first level.
        assert_eq!(levels[2], 0.0);
        // The small blob is never the largest component.
        assert_eq!(levels[3], 0.0);
        // The main blob survives every level.
        assert_eq!(levels[0], 1.0);
        assert_eq!(levels[5], 1.0);
    }

    #[rstest]
    #[case(vec![0.0; 16])]
    #[case((0..16).map(|i| i as f32 / 15.0).collect())]
    #[case(vec![0.3; 16])]
    fn identical_mattes_have_zero_connectivity_error(#[case] values: Vec<f32>) {
        let device = Default::default();
        let a = tensor_from_vec::<TestBackend>(values, [4, 4], &device);

        assert_relative_eq!(calculate_conn(a.clone(), a).unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn isolated_prediction_blob_is_penalized() {
        let device = Default::default();
        // Ground truth is a 2x2 block of ones; the prediction adds a detached pixel.
        let mut gt = vec![0.0; 25];
        for i in [0, 1, 5, 6] {
            gt[i] = 1.0;
        }
        let mut pred = gt.clone();
        pred[24] = 1.0;

        let gt = tensor_from_vec::<TestBackend>(gt, [5, 5], &device);
        let pred = tensor_from_vec::<TestBackend>(pred, [5, 5], &device);

        // The detached pixel rounds down to 0, so phi_pred = 0 while phi_gt = 1.
        assert_relative_eq!(
            calculate_conn(pred, gt).unwrap(),
            1.0 / 25.0,
            epsilon = 1e-9
        );
    }
}
