use std::path::PathBuf;

use matting_util::ImageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error(transparent)]
    Image(#[from] ImageError),

    #[error("no alpha matte for '{}' under '{}'", .relative.display(), .root.display())]
    MissingAlpha { root: PathBuf, relative: PathBuf },

    #[error("prediction is {prediction:?} but the image is {image:?}")]
    PredictionSizeMismatch {
        prediction: [usize; 2],
        image: [usize; 2],
    },

    #[error("mask threshold {0} is outside [0, 1]")]
    InvalidThreshold(f64),
}

pub type InferenceResult<T> = Result<T, InferenceError>;
