//! Shared building blocks for alpha-matte post-processing and evaluation.
//!
//! Everything here works on single-channel `[height, width]` tensors. The
//! operations that are naturally sequential (dilation, connected components)
//! move the data to the host once, run a tight loop there and return a tensor.

pub mod array_ops;
pub mod filters;
pub mod image;
pub mod labeling;
pub mod morphology;

pub use array_ops::{tensor_from_vec, tensor_to_vec};
pub use filters::{
    filter_replicate, gaussian_derivative_kernels, gaussian_gradient_magnitude, min_max_normalize,
};
pub use image::{
    find_counterpart, is_extension_supported, is_supported_image_format, ImageError, ImageResult,
    ImageUtils, SUPPORTED_EXTENSIONS,
};
pub use labeling::{label_components, ComponentLabels};
pub use morphology::{dilate_mask, dilation, StructuringElement};
