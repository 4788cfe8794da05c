//! Batch masking: predict, refine, save and optionally score every image.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use burn::tensor::{backend::Backend, Tensor};
use matting_inference::{InferenceError, MaskRefinementConfig, MattingModel, SourceImage};
use matting_metric::{EvaluationAccumulator, MatteMetrics, MetricSuite};
use matting_util::{find_counterpart, ImageUtils};
use serde::Serialize;

/// A resolved masking run.
#[derive(Debug, Clone)]
pub struct MaskingJob {
    /// Root scanned recursively for input images.
    pub images_dir: PathBuf,
    /// Masks are written here, mirroring the input tree.
    pub result_dir: PathBuf,
    /// Ground-truth alpha mattes, paired with inputs by relative path.
    pub gt_dir: Option<PathBuf>,
    pub refinement: MaskRefinementConfig,
    /// Optional JSON report destination.
    pub report_path: Option<PathBuf>,
}

impl MaskingJob {
    /// Output path of the mask for an input at `relative`.
    pub fn mask_path(&self, relative: &Path) -> PathBuf {
        self.result_dir.join(relative.with_extension("png"))
    }
}

/// Outcome counts of a masking run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
    pub discovered: usize,
    pub written: usize,
    pub failed: usize,
    pub evaluated: usize,
    pub missing_ground_truth: usize,
    pub rejected: usize,
    /// Mean scores over the evaluated images; `None` when nothing was evaluated.
    pub mean: Option<MatteMetrics>,
}

/// Run the masking pipeline over every image under `job.images_dir`.
///
/// Failures on individual images are logged and counted in the report;
/// only setup problems (missing input directory, bad settings, unwritable
/// report) return an error.
pub fn run_masking<B, M>(job: &MaskingJob, model: &M, device: &B::Device) -> Result<RunReport>
where
    B: Backend,
    M: MattingModel<B>,
{
    job.refinement.validate()?;
    if !job.images_dir.is_dir() {
        bail!(
            "images directory does not exist: {}",
            job.images_dir.display()
        );
    }

    tracing::info!(
        images = %job.images_dir.display(),
        results = %job.result_dir.display(),
        threshold = job.refinement.threshold,
        radius = job.refinement.radius,
        "running masking",
    );

    let files = ImageUtils::collect_image_files(&job.images_dir)?;
    let suite = MetricSuite::default();
    let mut totals = EvaluationAccumulator::new();
    let mut report = RunReport {
        discovered: files.len(),
        ..RunReport::default()
    };

    for path in &files {
        let relative = path.strip_prefix(&job.images_dir).unwrap_or(path);
        tracing::info!(path = %relative.display(), "processing image");

        let mask = match refine_image(job, model, path, relative, device) {
            Ok(mask) => mask,
            Err(err) => {
                report.failed += 1;
                tracing::error!(path = %relative.display(), error = %err, "image failed");
                continue;
            }
        };
        report.written += 1;

        let Some(gt_dir) = &job.gt_dir else {
            continue;
        };
        let Some(gt_path) = find_counterpart(gt_dir, relative) else {
            report.missing_ground_truth += 1;
            tracing::warn!(path = %relative.display(), "no ground truth, skipping evaluation");
            continue;
        };

        match evaluate(&suite, mask, &gt_path, device) {
            Ok(metrics) => {
                report.evaluated += 1;
                totals.add(&metrics);
                tracing::info!(path = %relative.display(), %metrics, "evaluated");
            }
            Err(err) => {
                report.rejected += 1;
                tracing::warn!(path = %relative.display(), error = %err, "evaluation rejected");
            }
        }
    }

    report.mean = totals.finalize().ok();
    match &report.mean {
        Some(mean) => tracing::info!(images = report.evaluated, %mean, "mean scores"),
        None if job.gt_dir.is_some() => tracing::warn!("no images were evaluated"),
        None => {}
    }
    tracing::info!(
        written = report.written,
        failed = report.failed,
        "masking completed"
    );

    if let Some(report_path) = &job.report_path {
        write_report(&report, report_path)?;
    }

    Ok(report)
}

/// Predict, threshold, dilate and save one image; returns the refined mask.
fn refine_image<B, M>(
    job: &MaskingJob,
    model: &M,
    path: &Path,
    relative: &Path,
    device: &B::Device,
) -> Result<Tensor<B, 2>>
where
    B: Backend,
    M: MattingModel<B>,
{
    let pixels = ImageUtils::load_rgb::<B, _>(path, device)?;
    let image = SourceImage::new(relative.to_path_buf(), pixels);

    let alpha = model.predict(&image)?;
    let (prediction, expected) = (alpha.dims(), image.dims());
    if prediction != expected {
        return Err(InferenceError::PredictionSizeMismatch {
            prediction,
            image: expected,
        }
        .into());
    }

    let mask = job.refinement.refine(alpha);
    let output = job.mask_path(relative);
    ImageUtils::save_inverted_mask(mask.clone(), &output)?;
    tracing::debug!(output = %output.display(), "mask saved");

    Ok(mask)
}

fn evaluate<B: Backend>(
    suite: &MetricSuite,
    mask: Tensor<B, 2>,
    gt_path: &Path,
    device: &B::Device,
) -> Result<MatteMetrics> {
    let gt = ImageUtils::load_alpha::<B, _>(gt_path, device)?;
    Ok(suite.evaluate(mask, gt)?)
}

fn write_report(report: &RunReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create '{}'", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json).with_context(|| format!("failed to write report '{}'", path.display()))
}
