//! JSON configuration for the masking run.
//!
//! Every field is optional in the file; command-line flags override whatever
//! the file sets.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use matting_inference::MaskRefinementConfig;
use serde::{Deserialize, Serialize};

use crate::masking::MaskingJob;

/// Settings of a masking run as read from a config file or flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MaskingConfig {
    pub images_dir: Option<PathBuf>,
    pub result_dir: Option<PathBuf>,
    pub alpha_dir: Option<PathBuf>,
    pub gt_dir: Option<PathBuf>,
    pub mask_thresh: Option<f64>,
    pub mask_radius: Option<usize>,
    /// Where to write the JSON run report.
    pub report: Option<PathBuf>,
}

impl MaskingConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config '{}'", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("invalid config '{}'", path.display()))
    }

    /// Fields set in `overrides` replace the ones in `self`.
    pub fn overridden_by(self, overrides: Self) -> Self {
        Self {
            images_dir: overrides.images_dir.or(self.images_dir),
            result_dir: overrides.result_dir.or(self.result_dir),
            alpha_dir: overrides.alpha_dir.or(self.alpha_dir),
            gt_dir: overrides.gt_dir.or(self.gt_dir),
            mask_thresh: overrides.mask_thresh.or(self.mask_thresh),
            mask_radius: overrides.mask_radius.or(self.mask_radius),
            report: overrides.report.or(self.report),
        }
    }

    /// Refinement parameters, with defaults for anything unset.
    pub fn refinement(&self) -> MaskRefinementConfig {
        let mut config = MaskRefinementConfig::new();
        if let Some(threshold) = self.mask_thresh {
            config.threshold = threshold;
        }
        if let Some(radius) = self.mask_radius {
            config.radius = radius;
        }
        config
    }

    /// Resolve into a runnable job; the image and result directories are required.
    pub fn to_job(&self) -> Result<MaskingJob> {
        let images_dir = self
            .images_dir
            .clone()
            .context("no images directory given (--images-dir or \"images_dir\")")?;
        let result_dir = self
            .result_dir
            .clone()
            .context("no result directory given (--result-dir or \"result_dir\")")?;

        let refinement = self.refinement();
        refinement.validate()?;

        Ok(MaskingJob {
            images_dir,
            result_dir,
            gt_dir: self.gt_dir.clone(),
            refinement,
            report_path: self.report.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_values_are_overridden_by_flags() {
        let file: MaskingConfig = serde_json::from_str(
            r#"{ "images_dir": "in", "result_dir": "out", "mask_thresh": 0.2, "mask_radius": 5 }"#,
        )
        .unwrap();
        let flags = MaskingConfig {
            result_dir: Some(PathBuf::from("elsewhere")),
            mask_radius: Some(9),
            ..MaskingConfig::default()
        };

        let merged = file.overridden_by(flags);
        assert_eq!(merged.images_dir, Some(PathBuf::from("in")));
        assert_eq!(merged.result_dir, Some(PathBuf::from("elsewhere")));
        assert_eq!(merged.mask_thresh, Some(0.2));
        assert_eq!(merged.mask_radius, Some(9));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let parsed = serde_json::from_str::<MaskingConfig>(r#"{ "mask_treshold": 0.2 }"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn defaults_fill_refinement() {
        let refinement = MaskingConfig::default().refinement();

        assert_eq!(refinement.threshold, 0.05);
        assert_eq!(refinement.radius, 20);
    }

    #[test]
    fn job_requires_directories_and_valid_threshold() {
        let missing = MaskingConfig {
            images_dir: Some(PathBuf::from("in")),
            ..MaskingConfig::default()
        };
        assert!(missing.to_job().is_err());

        let bad_threshold = MaskingConfig {
            images_dir: Some(PathBuf::from("in")),
            result_dir: Some(PathBuf::from("out")),
            mask_thresh: Some(2.0),
            ..MaskingConfig::default()
        };
        assert!(bad_threshold.to_job().is_err());

        let ok = MaskingConfig {
            images_dir: Some(PathBuf::from("in")),
            result_dir: Some(PathBuf::from("out")),
            gt_dir: Some(PathBuf::from("gt")),
            ..MaskingConfig::default()
        };
        let job = ok.to_job().unwrap();
        assert_eq!(job.gt_dir, Some(PathBuf::from("gt")));
        assert_eq!(job.refinement.radius, 20);
    }
}
