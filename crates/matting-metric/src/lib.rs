//! # Matting metrics
//!
//! Error metrics for alpha mattes, all operating on `[height, width]` burn
//! tensors with values in [0, 1]:
//!
//! - [`calculate_mad`]: mean absolute difference
//! - [`calculate_mse`]: mean squared error
//! - [`calculate_grad`]: gradient error (Gaussian-derivative magnitude, σ = 1.4)
//! - [`calculate_conn`]: connectivity error (step 0.1, 4-connectivity)
//! - [`calculate_iou`]: intersection over union at alpha ≥ 0.5
//!
//! [`MetricSuite`] computes all of them for one pair and
//! [`EvaluationAccumulator`] averages them over a batch.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use matting_metric::{EvaluationAccumulator, MetricSuite};
//!
//! let suite = MetricSuite::default();
//! let mut totals = EvaluationAccumulator::new();
//! totals.add(&suite.evaluate(pred, gt)?);
//! println!("{}", totals.finalize()?);
//! ```

pub mod aggregator;
pub mod conn;
pub mod error;
pub mod grad;
pub mod input;
pub mod iou;
pub mod mad;
pub mod mse;
pub mod suite;

pub use aggregator::EvaluationAccumulator;
pub use conn::{calculate_conn, calculate_conn_with, ConnectivityConfig};
pub use error::{MetricError, MetricResult};
pub use grad::{calculate_grad, calculate_grad_with, GradientConfig};
pub use input::MetricInput;
pub use iou::{calculate_iou, calculate_iou_with, IoUConfig};
pub use mad::calculate_mad;
pub use mse::calculate_mse;
pub use suite::{MatteMetrics, MetricSuite, MetricSuiteConfig};
