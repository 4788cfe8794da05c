//! Image loading, mask saving and input discovery

use std::path::{Path, PathBuf};

use burn::tensor::{backend::Backend, Tensor, TensorData};
use image::{DynamicImage, GenericImageView, GrayImage};
use thiserror::Error;
use walkdir::WalkDir;

use crate::array_ops::{tensor_from_vec, tensor_to_vec};

/// Extensions picked up when scanning image directories (compared case-insensitively).
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "tif", "tiff"];

/// ImageError covers all possible errors in image processing operations
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("failed to open image at '{}': {source}", .path.display())]
    ImageLoadError {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to save image to '{}': {source}", .path.display())]
    ImageSaveError {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to create directory '{}': {source}", .path.display())]
    CreateDirectoryError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to scan '{}': {source}", .path.display())]
    DirectoryScanError {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to create image buffer: {reason}")]
    BufferCreationError { reason: String },
}

/// Result type alias for ImageError
pub type ImageResult<T> = Result<T, ImageError>;

/// Image I/O for the masking pipeline
pub struct ImageUtils;

impl ImageUtils {
    /// Load an image as RGB
    ///
    /// # Returns
    /// Tensor of shape [3, height, width] with values in range [0, 1]
    pub fn load_rgb<B: Backend, P: AsRef<Path>>(
        path: P,
        device: &B::Device,
    ) -> ImageResult<Tensor<B, 3>> {
        let img = Self::open(path.as_ref())?;
        Ok(Self::dynamic_image_to_tensor(img, device))
    }

    /// Convert DynamicImage to a `[3, height, width]` tensor
    pub fn dynamic_image_to_tensor<B: Backend>(
        img: DynamicImage,
        device: &B::Device,
    ) -> Tensor<B, 3> {
        let (width, height) = img.dimensions();
        let buf = img.into_rgb32f().into_raw();

        let data =
            TensorData::new(buf, [height as usize, width as usize, 3]).convert::<B::FloatElem>();
        Tensor::<B, 3>::from_data(data, device).permute([2, 0, 1])
    }

    /// Load a single-channel alpha matte
    ///
    /// The file is reduced to 8-bit luma and divided by 255.
    ///
    /// # Returns
    /// Tensor of shape [height, width] with values in range [0, 1]
    pub fn load_alpha<B: Backend, P: AsRef<Path>>(
        path: P,
        device: &B::Device,
    ) -> ImageResult<Tensor<B, 2>> {
        let luma = Self::open(path.as_ref())?.to_luma8();
        Ok(Self::luma_to_alpha(&luma, device))
    }

    /// Convert 8-bit luma to an alpha tensor in [0, 1]
    pub fn luma_to_alpha<B: Backend>(luma: &GrayImage, device: &B::Device) -> Tensor<B, 2> {
        let (width, height) = luma.dimensions();
        let values = luma.as_raw().iter().map(|&v| f32::from(v) / 255.0).collect();
        tensor_from_vec(values, [height as usize, width as usize], device)
    }

    /// Encode an alpha matte as an inverted 8-bit mask
    ///
    /// Each pixel becomes `trunc((1 - alpha) * 255)`: foreground is dark,
    /// background is light.
    pub fn alpha_to_inverted_luma<B: Backend>(alpha: Tensor<B, 2>) -> ImageResult<GrayImage> {
        let [height, width] = alpha.dims();
        let pixels = tensor_to_vec(alpha)
            .into_iter()
            .map(|v| ((1.0 - v) * 255.0) as u8)
            .collect();

        GrayImage::from_raw(width as u32, height as u32, pixels).ok_or_else(|| {
            ImageError::BufferCreationError {
                reason: format!("{width}x{height} grayscale buffer has wrong length"),
            }
        })
    }

    /// Save an alpha matte as an inverted 8-bit mask, creating parent directories.
    pub fn save_inverted_mask<B: Backend, P: AsRef<Path>>(
        alpha: Tensor<B, 2>,
        path: P,
    ) -> ImageResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| {
                ImageError::CreateDirectoryError {
                    path: parent.to_path_buf(),
                    source,
                }
            })?;
        }

        Self::alpha_to_inverted_luma(alpha)?
            .save(path)
            .map_err(|source| ImageError::ImageSaveError {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Recursively collect supported images under `root`, sorted by path.
    pub fn collect_image_files<P: AsRef<Path>>(root: P) -> ImageResult<Vec<PathBuf>> {
        let root = root.as_ref();
        let mut files = Vec::new();

        for entry in WalkDir::new(root) {
            let entry = entry.map_err(|source| ImageError::DirectoryScanError {
                path: root.to_path_buf(),
                source,
            })?;
            if entry.file_type().is_file() && is_supported_image_format(entry.path()) {
                files.push(entry.into_path());
            }
        }

        files.sort();
        Ok(files)
    }

    fn open(path: &Path) -> ImageResult<DynamicImage> {
        image::open(path).map_err(|source| ImageError::ImageLoadError {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Whether `path` has one of [`SUPPORTED_EXTENSIONS`].
pub fn is_supported_image_format<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(is_extension_supported)
}

/// Find the file under `root` matching `relative` up to its extension.
///
/// The extension of `relative` is ignored; every supported extension is
/// tried in lowercase and uppercase, in [`SUPPORTED_EXTENSIONS`] order.
pub fn find_counterpart(root: &Path, relative: &Path) -> Option<PathBuf> {
    SUPPORTED_EXTENSIONS
        .iter()
        .flat_map(|ext| [ext.to_string(), ext.to_ascii_uppercase()])
        .map(|ext| root.join(relative.with_extension(ext)))
        .find(|candidate| candidate.is_file())
}

/// Whether an extension (with or without the leading dot) is supported.
pub fn is_extension_supported(ext: &str) -> bool {
    let ext = ext.trim_start_matches('.').to_ascii_lowercase();
    SUPPORTED_EXTENSIONS.contains(&ext.as_str())
}
