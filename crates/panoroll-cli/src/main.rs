mod config;
mod logging;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use tracing::{info, warn};

use panoroll_core::batch::{BatchProgress, JobState, Rejection};
use panoroll_core::decode::{probe, SUPPORTED_EXTENSIONS};
use panoroll_core::preview::DEFAULT_PREVIEW_BOUNDS;
use panoroll_core::{preview_file, BatchInputs, BatchRunner, CollisionPolicy};

use crate::config::{load_config, Config, LogFormat};
use crate::logging::setup_logging;

#[derive(Parser, Debug)]
#[command(name = "panoroll")]
#[command(version, about = "Rotate equirectangular panoramas around the vertical axis", long_about = None)]
struct Cli {
    /// Input files or directories
    #[arg(value_name = "INPUTS", required = true)]
    inputs: Vec<PathBuf>,

    /// Yaw in degrees (-180 to 180); positive pans the view to the right
    #[arg(
        short,
        long,
        value_name = "DEGREES",
        allow_negative_numbers = true,
        value_parser = parse_angle,
        required_unless_present = "probe"
    )]
    angle: Option<f64>,

    /// Output directory
    #[arg(
        short,
        long,
        value_name = "DIR",
        required_unless_present_any = ["probe", "preview"]
    )]
    out: Option<PathBuf>,

    /// Number of parallel workers
    #[arg(short = 'j', long, value_name = "N")]
    workers: Option<usize>,

    /// What to do when an output file already exists
    #[arg(long, value_enum, value_name = "POLICY")]
    collision: Option<CollisionArg>,

    /// JPEG re-encode quality (1-100)
    #[arg(long, value_name = "Q", value_parser = clap::value_parser!(u8).range(1..=100))]
    jpeg_quality: Option<u8>,

    /// Descend into subdirectories of directory inputs
    #[arg(short, long)]
    recursive: bool,

    /// Configuration file (defaults to ./panoroll.toml when present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write a side-by-side preview of the first input instead of running the batch
    #[arg(long, value_name = "FILE", conflicts_with = "probe")]
    preview: Option<PathBuf>,

    /// List size and format of each input and exit
    #[arg(long)]
    probe: bool,

    /// Log output format
    #[arg(long, value_enum, value_name = "FORMAT")]
    log_format: Option<LogFormat>,

    /// Do not print a line per finished file
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CollisionArg {
    Overwrite,
    Fail,
    Suffix,
}

impl From<CollisionArg> for CollisionPolicy {
    fn from(arg: CollisionArg) -> Self {
        match arg {
            CollisionArg::Overwrite => CollisionPolicy::Overwrite,
            CollisionArg::Fail => CollisionPolicy::Fail,
            CollisionArg::Suffix => CollisionPolicy::Suffix,
        }
    }
}

fn parse_angle(value: &str) -> Result<f64, String> {
    let angle: f64 = value
        .parse()
        .map_err(|_| format!("`{value}` is not a number"))?;
    if !(-180.0..=180.0).contains(&angle) {
        return Err(format!("angle must be between -180 and 180, got {angle}"));
    }
    Ok(angle)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = load_config(cli.config.as_deref())?;
    apply_overrides(&mut config, &cli);
    config.batch.validate()?;
    setup_logging(&config.logging)?;

    let inputs = collect_inputs(&cli.inputs, config.batch.recursive);
    if inputs.is_empty() {
        bail!(
            "no supported images found (accepted extensions: {})",
            SUPPORTED_EXTENSIONS.join(", ")
        );
    }

    if cli.probe {
        return Ok(print_probe(&inputs));
    }

    // Both are enforced by clap outside --probe.
    let angle = cli.angle.context("--angle is required")?;

    if let Some(target) = &cli.preview {
        write_preview(&inputs.paths()[0], angle, target)?;
        return Ok(ExitCode::SUCCESS);
    }

    let out = cli.out.as_deref().context("--out is required")?;
    let jobs = inputs.jobs(angle, out);
    let runner = BatchRunner::from_config(&config.batch);
    info!(
        files = jobs.len(),
        workers = runner.workers(),
        angle,
        out = %out.display(),
        "rotating"
    );

    let quiet = cli.quiet;
    let report = move |progress: BatchProgress| {
        if quiet {
            return;
        }
        let status = match progress.state {
            JobState::Succeeded => "ok",
            JobState::Failed => "FAILED",
            JobState::Cancelled => "cancelled",
        };
        println!(
            "[{}/{}] {} {}",
            progress.completed,
            progress.total,
            status,
            progress.source.display()
        );
    };

    let result = runner.run(&jobs, &report)?;

    println!(
        "Processed {} file(s): {} succeeded, {} failed",
        result.total(),
        result.succeeded(),
        result.failed()
    );
    for message in result.failure_messages() {
        println!("  {message}");
    }

    Ok(if result.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Flags win over every other configuration source.
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(workers) = cli.workers {
        config.batch.workers = Some(workers);
    }
    if let Some(collision) = cli.collision {
        config.batch.collision = collision.into();
    }
    if let Some(quality) = cli.jpeg_quality {
        config.batch.jpeg_quality = quality;
    }
    if cli.recursive {
        config.batch.recursive = true;
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }
}

fn collect_inputs(paths: &[PathBuf], recursive: bool) -> BatchInputs {
    let mut inputs = BatchInputs::new();
    for path in paths {
        if path.is_dir() {
            let added = inputs.add_directory(path, recursive);
            info!(dir = %path.display(), added, "expanded directory");
            continue;
        }
        match inputs.add(path) {
            Ok(()) => {}
            Err(Rejection::Duplicate) => {}
            Err(Rejection::NotAFile) => warn!(path = %path.display(), "not a file, skipped"),
            Err(Rejection::UnsupportedExtension) => {
                warn!(path = %path.display(), "unsupported extension, skipped")
            }
        }
    }
    inputs
}

fn print_probe(inputs: &BatchInputs) -> ExitCode {
    let mut all_ok = true;
    for path in inputs.paths() {
        match probe(path) {
            Ok(info) => println!(
                "{}: {}x{} {}",
                path.display(),
                info.width,
                info.height,
                info.format.name()
            ),
            Err(e) => {
                all_ok = false;
                println!("{}: {e}", path.display());
            }
        }
    }
    if all_ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn write_preview(source: &Path, angle: f64, target: &Path) -> anyhow::Result<()> {
    let preview = preview_file(source, angle, DEFAULT_PREVIEW_BOUNDS)
        .with_context(|| format!("failed to preview {}", source.display()))?;
    preview
        .side_by_side()
        .save(target)
        .with_context(|| format!("failed to write {}", target.display()))?;
    println!(
        "Preview of {} at {angle:.1} deg (shift {} px) written to {}",
        source.display(),
        preview.shift,
        target.display()
    );
    Ok(())
}
