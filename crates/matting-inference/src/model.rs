//! The matting model seam.
//!
//! The masking pipeline never looks inside the network that produces alpha
//! mattes; it only needs something implementing [`MattingModel`].

use std::path::{Path, PathBuf};

use burn::tensor::{backend::Backend, Tensor};
use derive_new::new;
use matting_util::{find_counterpart, ImageUtils};

use crate::error::{InferenceError, InferenceResult};

/// A decoded input image and where it came from.
#[derive(new, Debug, Clone)]
pub struct SourceImage<B: Backend> {
    /// Path relative to the input root.
    pub relative_path: PathBuf,
    /// RGB pixels `[3, height, width]` in [0, 1].
    pub pixels: Tensor<B, 3>,
}

impl<B: Backend> SourceImage<B> {
    /// `[height, width]` of the image.
    pub fn dims(&self) -> [usize; 2] {
        let [_, height, width] = self.pixels.dims();
        [height, width]
    }
}

/// Anything that predicts an alpha matte for an image.
///
/// Implementations return a `[height, width]` tensor with values in [0, 1]
/// and the same size as the image.
pub trait MattingModel<B: Backend> {
    fn predict(&self, image: &SourceImage<B>) -> InferenceResult<Tensor<B, 2>>;
}

impl<B, F> MattingModel<B> for F
where
    B: Backend,
    F: Fn(&SourceImage<B>) -> InferenceResult<Tensor<B, 2>>,
{
    fn predict(&self, image: &SourceImage<B>) -> InferenceResult<Tensor<B, 2>> {
        self(image)
    }
}

/// Serves alpha mattes that were computed ahead of time.
///
/// The matte for `images/a/b.jpg` is looked up as `<root>/a/b.<ext>` for any
/// supported image extension and decoded as 8-bit grayscale.
#[derive(Debug, Clone)]
pub struct AlphaDirectoryModel {
    root: PathBuf,
}

impl AlphaDirectoryModel {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Path of the stored matte for `relative`, if there is one.
    pub fn locate(&self, relative: &Path) -> Option<PathBuf> {
        find_counterpart(&self.root, relative)
    }
}

impl<B: Backend> MattingModel<B> for AlphaDirectoryModel {
    fn predict(&self, image: &SourceImage<B>) -> InferenceResult<Tensor<B, 2>> {
        let path = self
            .locate(&image.relative_path)
            .ok_or_else(|| InferenceError::MissingAlpha {
                root: self.root.clone(),
                relative: image.relative_path.clone(),
            })?;

        tracing::debug!(alpha = %path.display(), "loading precomputed alpha");
        Ok(ImageUtils::load_alpha(&path, &image.pixels.device())?)
    }
}
