//! Batch averaging of per-image metrics.

use crate::{
    error::{MetricError, MetricResult},
    suite::MatteMetrics,
};

/// Running sums of [`MatteMetrics`] over a batch of images.
///
/// Not synchronized. Workers running in parallel should each keep their own
/// accumulator and combine them with [`merge`](Self::merge).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationAccumulator {
    sums: MatteMetrics,
    count: usize,
}

impl EvaluationAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one image's scores.
    pub fn add(&mut self, metrics: &MatteMetrics) {
        self.sums.mad += metrics.mad;
        self.sums.mse += metrics.mse;
        self.sums.grad += metrics.grad;
        self.sums.conn += metrics.conn;
        self.sums.iou += metrics.iou;
        self.count += 1;
    }

    /// Number of images added since creation or the last reset.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Per-metric mean over every added image.
    ///
    /// # Errors
    /// [`MetricError::EmptyBatch`] when nothing has been added.
    pub fn finalize(&self) -> MetricResult<MatteMetrics> {
        if self.count == 0 {
            return Err(MetricError::EmptyBatch);
        }
        let n = self.count as f64;

        Ok(MatteMetrics {
            mad: self.sums.mad / n,
            mse: self.sums.mse / n,
            grad: self.sums.grad / n,
            conn: self.sums.conn / n,
            iou: self.sums.iou / n,
        })
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Fold another accumulator's sums and count into this one.
    pub fn merge(&mut self, other: &Self) {
        self.sums.mad += other.sums.mad;
        self.sums.mse += other.sums.mse;
        self.sums.grad += other.sums.grad;
        self.sums.conn += other.sums.conn;
        self.sums.iou += other.sums.iou;
        self.count += other.count;
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn empty_batch_is_an_error() {
        let accumulator = EvaluationAccumulator::new();

        assert_eq!(accumulator.count(), 0);
        assert_eq!(accumulator.finalize(), Err(MetricError::EmptyBatch));
    }

    #[test]
    fn finalize_averages_each_metric() {
        let mut accumulator = EvaluationAccumulator::new();
        accumulator.add(&MatteMetrics::new(0.1, 0.2, 0.3, 0.4, 1.0));
        accumulator.add(&MatteMetrics::new(0.3, 0.0, 0.1, 0.0, 0.5));

        let mean = accumulator.finalize().unwrap();
        assert_eq!(accumulator.count(), 2);
        assert_relative_eq!(mean.mad, 0.2, epsilon = 1e-12);
        assert_relative_eq!(mean.mse, 0.1, epsilon = 1e-12);
        assert_relative_eq!(mean.grad, 0.2, epsilon = 1e-12);
        assert_relative_eq!(mean.conn, 0.2, epsilon = 1e-12);
        assert_relative_eq!(mean.iou, 0.75, epsilon = 1e-12);
    }

    #[test]
    fn reset_clears_state() {
        let mut accumulator = EvaluationAccumulator::new();
        accumulator.add(&MatteMetrics::new(1.0, 1.0, 1.0, 1.0, 1.0));
        accumulator.reset();

        assert_eq!(accumulator, EvaluationAccumulator::new());
        assert!(accumulator.finalize().is_err());
    }

    #[test]
    fn merge_matches_sequential_adds() {
        let samples = [
            MatteMetrics::new(0.1, 0.01, 0.2, 0.3, 0.9),
            MatteMetrics::new(0.4, 0.16, 0.1, 0.0, 0.4),
            MatteMetrics::new(0.0, 0.0, 0.0, 0.0, 1.0),
        ];
        let mut sequential = EvaluationAccumulator::new();
        samples.iter().for_each(|m| sequential.add(m));

        let mut left = EvaluationAccumulator::new();
        left.add(&samples[0]);
        let mut right = EvaluationAccumulator::new();
        right.add(&samples[1]);
        right.add(&samples[2]);
        left.merge(&right);

        assert_eq!(left.count(), 3);
        let (a, b) = (left.finalize().unwrap(), sequential.finalize().unwrap());
        assert_relative_eq!(a.mad, b.mad, epsilon = 1e-12);
        assert_relative_eq!(a.iou, b.iou, epsilon = 1e-12);
    }
}
