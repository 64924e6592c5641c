//! Hevconv - HEVC re-encoding front-end for ffmpeg
//!
//! This is the main entry point for the hevconv application, which
//! re-encodes video files into HEVC through an external ffmpeg process
//! using the nvenc or libx265 backend.

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{Level, info, warn};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use hevconv::cli::Args;
use hevconv::command::ConversionCommand;
use hevconv::config::Config;
use hevconv::executor::ConversionExecutor;
use hevconv::params::{self, RawParams};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;

    // Load configuration
    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            // Try to load hevconv.toml from current directory first
            if std::path::Path::new("hevconv.toml").exists() {
                info!("Found hevconv.toml in current directory, loading...");
                Config::from_file("hevconv.toml")?
            } else {
                Config::default()
            }
        }
    };

    // An explicit output path cannot apply to more than one input.
    let explicit_output = if args.inputs.len() > 1 && args.output.is_some() {
        warn!("--output is ignored when converting multiple files; generated names are used");
        None
    } else {
        args.output.clone()
    };

    let executor = ConversionExecutor::new(&config.ffmpeg.binary_path);

    for input in &args.inputs {
        let raw = merge_params(input.clone(), explicit_output.clone(), &args, &config);
        let params = params::validate(&raw)?;
        let command = ConversionCommand::from_params(&params);

        info!(
            "Starting conversion: {} => {}",
            params.input.display(),
            command.output.display()
        );
        convert_one(&executor, &command).await?;
        info!("Conversion succeeded: {}", command.output.display());
        println!("Converted {} => {}", input.display(), command.output.display());
    }

    Ok(())
}

/// CLI flags win over config file values, config file values win over the
/// built-in defaults carried by `RawParams::new`.
fn merge_params(
    input: PathBuf,
    output: Option<PathBuf>,
    args: &Args,
    config: &Config,
) -> RawParams {
    let mut raw = RawParams::new(input);
    raw.output = output;

    let defaults = &config.defaults;
    if let Some(crf) = args.crf.or(defaults.crf) {
        raw.crf = crf;
    }
    if let Some(preset) = args.preset.clone().or_else(|| defaults.preset.clone()) {
        raw.preset = preset;
    }
    if let Some(codec) = args
        .audio_codec
        .clone()
        .or_else(|| defaults.audio_codec.clone())
    {
        raw.audio_codec = codec;
    }
    raw.resolution = args
        .resolution
        .clone()
        .or_else(|| defaults.resolution.clone());
    if let Some(encoder) = args.encoder.clone().or_else(|| defaults.encoder.clone()) {
        raw.encoder = encoder;
    }
    raw.bitrate = args.bitrate.clone().or_else(|| defaults.bitrate.clone());

    raw
}

/// Run one conversion with a console progress bar fed from the executor's
/// percentage updates.
async fn convert_one(executor: &ConversionExecutor, command: &ConversionCommand) -> Result<()> {
    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let (tx, mut rx) = mpsc::channel::<f64>(16);
    let bar_handle = bar.clone();
    let updater = tokio::spawn(async move {
        while let Some(percentage) = rx.recv().await {
            bar_handle.set_position(percentage.round() as u64);
        }
    });

    let result = executor.execute_with_progress(command, tx).await;
    let _ = updater.await;

    match result {
        Ok(_) => {
            bar.finish_with_message("done");
            Ok(())
        }
        Err(e) => {
            bar.abandon_with_message("failed");
            Err(e.into())
        }
    }
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir = std::env::current_dir()?.join(".hevconv").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "hevconv.log");
    let (non_blocking_file, _guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(_guard);

    // Determine log level
    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    // Create console layer
    let console_layer = fmt::layer().with_target(false);

    // Create file layer
    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_ansi(false); // No ANSI colors in file

    // Setup layered subscriber
    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer);

    // Initialize the subscriber
    subscriber
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
