//! Raw photo conversion
//!
//! Raw camera files are decoded to TIFF by an external decoder (`dcraw -c -T`)
//! and get their EXIF data copied over with `exiftool -TagsFromFile`. JPEGs are
//! copied as they are. Files are processed in parallel on a rayon pool.

use std::{
    ffi::OsString,
    fs::{self, File},
    io,
    path::{Path, PathBuf},
    process::{Command, ExitStatus, Stdio},
};

use anyhow::{Context, Result};
use derive_new::new;
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

/// Raw formats handed to the decoder (compared case-insensitively).
pub const RAW_EXTENSIONS: [&str; 5] = ["arw", "cr2", "nef", "dng", "raf"];

/// Formats copied without conversion.
pub const JPEG_EXTENSIONS: [&str; 2] = ["jpg", "jpeg"];

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("'{program}' failed on '{}' ({status})", .path.display())]
    ExitStatus {
        program: String,
        path: PathBuf,
        status: ExitStatus,
    },

    #[error("i/o error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// How a source file is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Raw,
    Jpeg,
    Other,
}

/// Classify a file by its lowercase extension.
pub fn classify(path: &Path) -> FileKind {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return FileKind::Other;
    };
    let ext = ext.to_ascii_lowercase();
    if RAW_EXTENSIONS.contains(&ext.as_str()) {
        FileKind::Raw
    } else if JPEG_EXTENSIONS.contains(&ext.as_str()) {
        FileKind::Jpeg
    } else {
        FileKind::Other
    }
}

/// TIFF file name for a raw file: `IMG_01.CR2` becomes `IMG_01.cr2.tif`.
pub fn tiff_output_name(path: &Path) -> Option<OsString> {
    let stem = path.file_stem()?;
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();

    let mut name = stem.to_os_string();
    name.push(format!(".{ext}.tif"));
    Some(name)
}

/// A conversion run.
#[derive(new, Debug, Clone)]
pub struct ConvertJob {
    pub source_dir: PathBuf,
    pub dest_dir: PathBuf,
    /// Worker threads; `None` uses one per CPU.
    pub jobs: Option<usize>,
    /// Raw decoder executable.
    pub dcraw: PathBuf,
    /// Metadata tool executable.
    pub exiftool: PathBuf,
}

/// Outcome counts of a conversion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionReport {
    pub converted: usize,
    pub copied: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Converted,
    Copied,
    Skipped,
}

/// Convert or copy every file directly inside `job.source_dir`.
///
/// Subdirectories are not visited. A failing file is logged and counted; the
/// run only errors when the directories themselves are unusable.
pub fn run_conversion(job: &ConvertJob) -> Result<ConversionReport> {
    fs::create_dir_all(&job.dest_dir)
        .with_context(|| format!("failed to create '{}'", job.dest_dir.display()))?;

    let files = list_files(&job.source_dir)?;
    tracing::info!(
        source = %job.source_dir.display(),
        dest = %job.dest_dir.display(),
        files = files.len(),
        "converting",
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(job.jobs.unwrap_or(0))
        .build()
        .context("failed to start worker pool")?;
    let outcomes: Vec<_> = pool.install(|| {
        files
            .par_iter()
            .map(|path| (path, convert_file(job, path)))
            .collect()
    });

    let mut report = ConversionReport::default();
    for (path, outcome) in outcomes {
        match outcome {
            Ok(Outcome::Converted) => report.converted += 1,
            Ok(Outcome::Copied) => report.copied += 1,
            Ok(Outcome::Skipped) => report.skipped += 1,
            Err(err) => {
                report.failed += 1;
                tracing::error!(path = %path.display(), error = %err, "conversion failed");
            }
        }
    }

    tracing::info!(
        converted = report.converted,
        copied = report.copied,
        skipped = report.skipped,
        failed = report.failed,
        "conversion completed"
    );
    Ok(report)
}

fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("failed to read '{}'", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to read '{}'", dir.display()))?;
        if entry.file_type().is_ok_and(|t| t.is_file()) {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

fn convert_file(job: &ConvertJob, path: &Path) -> Result<Outcome, ConvertError> {
    match classify(path) {
        FileKind::Raw => {
            let Some(name) = tiff_output_name(path) else {
                return Ok(Outcome::Skipped);
            };
            let output = job.dest_dir.join(name);
            let converted = decode_raw(&job.dcraw, path, &output)
                .and_then(|()| copy_metadata(&job.exiftool, path, &output));
            if let Err(err) = converted {
                // A partial TIFF would pass for a finished conversion.
                let _ = fs::remove_file(&output);
                return Err(err);
            }
            tracing::info!(source = %path.display(), output = %output.display(), "converted");
            Ok(Outcome::Converted)
        }
        FileKind::Jpeg => {
            let Some(name) = path.file_name() else {
                return Ok(Outcome::Skipped);
            };
            let output = job.dest_dir.join(name);
            fs::copy(path, &output).map_err(|source| ConvertError::Io {
                path: output.clone(),
                source,
            })?;
            tracing::info!(source = %path.display(), output = %output.display(), "copied");
            Ok(Outcome::Copied)
        }
        FileKind::Other => {
            tracing::debug!(path = %path.display(), "skipped");
            Ok(Outcome::Skipped)
        }
    }
}

/// `dcraw -c -T <source> > <output>`
fn decode_raw(dcraw: &Path, source: &Path, output: &Path) -> Result<(), ConvertError> {
    let file = File::create(output).map_err(|err| ConvertError::Io {
        path: output.to_path_buf(),
        source: err,
    })?;

    let mut command = Command::new(dcraw);
    command.arg("-c").arg("-T").arg(source).stdout(file);
    run(command, dcraw, source)
}

/// `exiftool -TagsFromFile <source> <output> -overwrite_original`
fn copy_metadata(exiftool: &Path, source: &Path, output: &Path) -> Result<(), ConvertError> {
    let mut command = Command::new(exiftool);
    command
        .arg("-TagsFromFile")
        .arg(source)
        .arg(output)
        .arg("-overwrite_original")
        .stdout(Stdio::null());
    run(command, exiftool, source)
}

fn run(mut command: Command, program: &Path, source: &Path) -> Result<(), ConvertError> {
    let program = program.display().to_string();
    let status = command.status().map_err(|err| ConvertError::Spawn {
        program: program.clone(),
        source: err,
    })?;

    if status.success() {
        Ok(())
    } else {
        Err(ConvertError::ExitStatus {
            program,
            path: source.to_path_buf(),
            status,
        })
    }
}
