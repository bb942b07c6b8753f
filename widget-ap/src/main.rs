//! Widget PCM test player (widget-ap) - Main entry point
//!
//! With no inputs, plays a sine tone at the configured default rate. With
//! a single supported sample rate (e.g. `widget-ap 96000`), plays the tone
//! at that rate. Otherwise every input is a WAV file, played in order.
//!
//! Ctrl-C stops playback. Pressing Enter skips to the next file (or ends
//! the tone).
//!
//! Exit codes: 0 success, 1 fatal error, 2 playlist finished with skipped
//! files.

use std::io::BufRead;
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{debug, error, info, warn};

use widget_ap::audio::{AudioSink, ClockedSink, CpalSink, SampleWidth};
use widget_ap::config::{CliOverrides, Mode, PlayerConfig};
use widget_ap::playback::{PlaybackControl, PlaybackEngine};
use widget_common::config::load_config;
use widget_common::logging;

/// Exit code when some playlist files were skipped
const EXIT_SKIPPED: u8 = 2;

/// Crates whose log output is filtered by the configured level
const LOG_TARGETS: [&str; 2] = ["widget_ap", "widget_common"];

/// Command-line arguments for widget-ap
#[derive(Parser, Debug)]
#[command(name = "widget-ap")]
#[command(about = "PCM test player for UAC2 widget audio sinks")]
#[command(version)]
struct Args {
    /// Log header diagnostics for every file
    #[arg(short, long)]
    verbose: bool,

    /// Config file (overrides WIDGET_CONFIG and the default locations)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Output device name (default: system default device)
    #[arg(short, long, value_name = "NAME")]
    device: Option<String>,

    /// Play through a software-clocked sink instead of a device
    #[arg(long)]
    null_output: bool,

    /// List output devices and exit
    #[arg(long)]
    list_devices: bool,

    /// How often playback checks for skip/quit, in milliseconds
    #[arg(long, value_name = "MS")]
    poll_interval_ms: Option<u64>,

    /// WAV files to play, or a single sample rate for the sine generator
    inputs: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("widget-ap: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    let (toml, origin) =
        load_config(args.config.as_deref()).context("Failed to load configuration")?;

    let config = PlayerConfig::merge(
        toml,
        CliOverrides {
            device: args.device,
            verbose: args.verbose,
            null_output: args.null_output,
            poll_interval_ms: args.poll_interval_ms,
        },
    )
    .context("Invalid configuration")?;

    logging::init(&config.logging, config.verbose, &LOG_TARGETS)
        .context("Failed to initialize logging")?;

    // Build identification first, before any device work
    info!(
        "Starting widget-ap v{} [{}] built {} ({}, {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE"),
        env!("BUILD_TARGET")
    );
    // Config is read before the subscriber exists; report where it came from now
    info!("{}", origin.summary());
    debug!("Effective configuration: {:?}", config);

    if args.list_devices {
        let devices = CpalSink::list_devices().context("Failed to list output devices")?;
        for device in devices {
            println!("{}", device);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let mode = Mode::from_inputs(&args.inputs, config.generator_rate);
    let control = PlaybackControl::new();
    spawn_control_listeners(&control);

    // cpal streams are not Send: the sink is created and dropped on the
    // blocking thread that runs the engine
    tokio::task::spawn_blocking(move || run_engine(config, mode, control))
        .await
        .context("Playback thread panicked")?
}

/// Ctrl-C requests quit; a line on stdin requests skip
fn spawn_control_listeners(control: &PlaybackControl) {
    let quit = control.clone();
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl+C, stopping playback");
                quit.request_quit();
            }
            Err(e) => warn!("Failed to install Ctrl+C handler: {}", e),
        }
    });

    // Plain thread: a pending stdin read must not hold up runtime shutdown
    let skip = control.clone();
    let spawned = thread::Builder::new()
        .name("stdin-skip".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                if line.is_err() {
                    break;
                }
                info!("Skip requested");
                skip.request_skip();
            }
        });
    if let Err(e) = spawned {
        warn!("Console skip unavailable: {}", e);
    }
}

fn run_engine(config: PlayerConfig, mode: Mode, control: PlaybackControl) -> Result<ExitCode> {
    let sink: Box<dyn AudioSink> = if config.null_output {
        info!("Using software-clocked null output");
        Box::new(ClockedSink::new(SampleWidth::Four))
    } else {
        Box::new(
            CpalSink::open(config.device.as_deref()).context("No usable audio output device")?,
        )
    };

    let mut engine = PlaybackEngine::new(sink, control, config.engine_options());

    match mode {
        Mode::Generator { rate } => {
            engine
                .run_generator(rate)
                .with_context(|| format!("Signal generator at {} Hz failed", rate))?;
            Ok(ExitCode::SUCCESS)
        }
        Mode::Player { files } => {
            let summary = engine.play_files(&files).context("Playback aborted")?;
            summary.log();
            if summary.has_skips() {
                Ok(ExitCode::from(EXIT_SKIPPED))
            } else {
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}
