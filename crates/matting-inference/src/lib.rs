pub mod error;
pub mod model;
pub mod postprocessing;

pub use error::{InferenceError, InferenceResult};
pub use model::{AlphaDirectoryModel, MattingModel, SourceImage};
pub use postprocessing::*;
