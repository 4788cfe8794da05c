use thiserror::Error;

/// Errors produced while scoring a prediction against ground truth.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetricError {
    #[error("prediction is {pred:?} but ground truth is {gt:?}")]
    ShapeMismatch { pred: [usize; 2], gt: [usize; 2] },

    #[error("no images were evaluated")]
    EmptyBatch,
}

pub type MetricResult<T> = Result<T, MetricError>;
