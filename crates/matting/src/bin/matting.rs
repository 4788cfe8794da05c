use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use matting::{
    backend::{create_device, get_backend_name, SelectedBackend},
    config::MaskingConfig,
    convert::{run_conversion, ConvertJob},
    inference::AlphaDirectoryModel,
    masking::run_masking,
};

#[derive(Parser)]
#[command(name = "matting")]
#[command(about = "Alpha-matte masking, matte evaluation and raw photo conversion")]
struct Cli {
    /// Log at DEBUG level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Turn alpha mattes into dilated masks and optionally score them
    Mask(MaskArgs),

    /// Convert raw camera files to TIFF and copy JPEGs
    Convert(ConvertArgs),

    /// Show backend information
    Info,
}

#[derive(Args)]
struct MaskArgs {
    /// Directory scanned recursively for input images
    #[arg(long)]
    images_dir: Option<PathBuf>,

    /// Output directory for masks
    #[arg(long)]
    result_dir: Option<PathBuf>,

    /// Directory of predicted alpha mattes mirroring the images directory
    #[arg(long)]
    alpha_dir: Option<PathBuf>,

    /// Ground-truth alpha mattes; enables evaluation
    #[arg(long)]
    gt_dir: Option<PathBuf>,

    /// Alpha threshold in [0, 1] [default: 0.05]
    #[arg(long)]
    mask_thresh: Option<f64>,

    /// Size of the elliptical dilation kernel in pixels [default: 20]
    #[arg(long)]
    mask_radius: Option<usize>,

    /// JSON config file; flags take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write a JSON run report here
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Args)]
struct ConvertArgs {
    /// Directory holding raw and JPEG files
    #[arg(long, default_value = "./source")]
    source_dir: PathBuf,

    /// Output directory
    #[arg(long, default_value = "./converted")]
    dest_dir: PathBuf,

    /// Worker threads [default: number of CPUs]
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Raw decoder executable
    #[arg(long, default_value = "dcraw")]
    dcraw: PathBuf,

    /// Metadata copy executable
    #[arg(long, default_value = "exiftool")]
    exiftool: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Mask(args) => mask(args),
        Commands::Convert(args) => convert(args),
        Commands::Info => {
            println!("matting information:");
            println!("  Backend: {}", get_backend_name());
            println!("  Device: {:?}", create_device());
            Ok(())
        }
    }
}

fn mask(args: MaskArgs) -> Result<()> {
    let file = match &args.config {
        Some(path) => MaskingConfig::from_file(path)?,
        None => MaskingConfig::default(),
    };
    let config = file.overridden_by(MaskingConfig {
        images_dir: args.images_dir,
        result_dir: args.result_dir,
        alpha_dir: args.alpha_dir,
        gt_dir: args.gt_dir,
        mask_thresh: args.mask_thresh,
        mask_radius: args.mask_radius,
        report: args.report,
    });

    let job = config.to_job()?;
    let alpha_dir = config
        .alpha_dir
        .context("no alpha directory given (--alpha-dir or \"alpha_dir\")")?;
    let model = AlphaDirectoryModel::new(alpha_dir);

    let device = create_device();
    tracing::info!(backend = get_backend_name(), "using backend");

    let report = run_masking::<SelectedBackend, _>(&job, &model, &device)?;

    println!(
        "{} of {} masks written ({} failed)",
        report.written, report.discovered, report.failed
    );
    if job.gt_dir.is_some() {
        match report.mean {
            Some(mean) => println!("Mean over {} images: {mean}", report.evaluated),
            None => println!("No images were evaluated"),
        }
    }
    Ok(())
}

fn convert(args: ConvertArgs) -> Result<()> {
    let job = ConvertJob::new(
        args.source_dir,
        args.dest_dir,
        args.jobs,
        args.dcraw,
        args.exiftool,
    );
    let report = run_conversion(&job)?;

    println!(
        "{} converted, {} copied, {} skipped, {} failed",
        report.converted, report.copied, report.skipped, report.failed
    );
    Ok(())
}
