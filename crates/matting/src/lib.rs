//! Alpha-matte masking and raw photo conversion.
//!
//! The `matting` binary drives two jobs:
//!
//! - [`masking::run_masking`] turns predicted alpha mattes into dilated binary
//!   masks and, given ground truth, reports MAD, MSE, gradient, connectivity
//!   and IoU scores.
//! - [`convert::run_conversion`] converts a folder of raw camera files to TIFF.

pub mod backend;
pub mod config;
pub mod convert;
pub mod masking;

#[doc(inline)]
pub use matting_inference as inference;
#[doc(inline)]
pub use matting_metric as metric;
#[doc(inline)]
pub use matting_util as util;
