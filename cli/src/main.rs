use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use facemark::{DetectorParams, FacePipeline, ProcessReport, DEFAULT_MODEL_PATH, DEFAULT_QUALITY};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    name = "facemark",
    version,
    about = "Detect faces in a compressed image, mark them, and save per-face crops"
)]
struct Args {
    /// Input image file
    input: PathBuf,

    /// Output path for the marked image (default: <input stem>_marked.jpg)
    output: Option<PathBuf>,

    /// Processing mode; "-p" (process) is the only recognized mode
    #[arg(allow_hyphen_values = true)]
    mode: Option<String>,

    /// Detector model file
    #[arg(long, default_value = DEFAULT_MODEL_PATH)]
    model: PathBuf,

    /// JPEG quality for all outputs, 0-100
    #[arg(long, default_value_t = DEFAULT_QUALITY)]
    quality: u8,

    /// Pyramid step between detector scan scales, in (0, 1)
    #[arg(long)]
    scale_factor: Option<f32>,

    /// Minimum overlapping-detection support to accept a candidate
    #[arg(long)]
    min_neighbors: Option<u32>,

    /// Smallest detection window, in pixels
    #[arg(long)]
    min_size: Option<u32>,

    /// Invert colors before detection
    #[arg(long)]
    invert: bool,

    /// Write the intermediate grayscale image here (debug aid)
    #[arg(long)]
    luma_preview: Option<PathBuf>,
}

fn main() -> ExitCode {
    init_tracing();
    // clap exits with status 2 on its own; argument problems must exit 1.
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS // --help / --version
            };
        }
    };

    let mode = args.mode.as_deref().unwrap_or("-p");
    if mode != "-p" {
        eprintln!("unrecognized mode '{mode}'");
        let _ = Args::command().print_help();
        return ExitCode::FAILURE;
    }

    match run(args) {
        Ok(report) => {
            info!(
                "done: {} region(s), annotated image at {}",
                report.regions.len(),
                report.annotated_path.display()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<ProcessReport> {
    let output = args
        .output
        .unwrap_or_else(|| default_output(&args.input));

    let mut params = DetectorParams::default();
    if let Some(value) = args.scale_factor {
        params.scale_factor = value;
    }
    if let Some(value) = args.min_neighbors {
        params.min_neighbors = value;
    }
    if let Some(value) = args.min_size {
        params.min_size = value;
    }

    let mut pipeline = FacePipeline::new(&args.input, output)
        .quality(args.quality)
        .invert(args.invert)
        .model_path(&args.model)
        .detector_params(params);
    if let Some(path) = &args.luma_preview {
        pipeline = pipeline.luma_preview(path);
    }

    pipeline
        .run()
        .with_context(|| format!("processing '{}' failed", args.input.display()))
}

fn default_output(input: &std::path::Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    input.with_file_name(format!("{stem}_marked.jpg"))
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
