//! widget-ap runtime configuration
//!
//! Merges command-line flags over the TOML bootstrap file and decides the
//! run mode from the positional inputs.
//!
//! # Settings Sources Priority
//!
//! 1. Command-line arguments
//! 2. TOML configuration file (see `widget_common::config`)
//! 3. Built-in defaults

use crate::audio::wav::SUPPORTED_SAMPLE_RATES;
use crate::error::{Error, Result};
use crate::playback::EngineOptions;
use std::path::{Path, PathBuf};
use std::time::Duration;
use widget_common::config::{LoggingConfig, TomlConfig};

/// Values given on the command line; `None`/`false` defers to the file
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub device: Option<String>,
    pub verbose: bool,
    pub null_output: bool,
    pub poll_interval_ms: Option<u64>,
}

/// Effective player configuration
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    /// Output device name (None = system default)
    pub device: Option<String>,
    pub verbose: bool,
    /// Use the software-clocked sink instead of a device
    pub null_output: bool,
    pub poll_interval: Duration,
    /// Generator rate when no rate argument is given
    pub generator_rate: u32,
    pub logging: LoggingConfig,
}

impl PlayerConfig {
    /// Layer CLI flags over the TOML values
    ///
    /// # Errors
    /// `Error::Config` for a zero poll interval or an unsupported
    /// generator rate.
    pub fn merge(toml: TomlConfig, cli: CliOverrides) -> Result<Self> {
        let poll_interval_ms = cli.poll_interval_ms.unwrap_or(toml.poll_interval_ms);
        if poll_interval_ms == 0 {
            return Err(config_error("poll interval must be at least 1 ms"));
        }

        if !SUPPORTED_SAMPLE_RATES.contains(&toml.generator_rate) {
            return Err(config_error(format!(
                "generator_rate {} is not a supported sample rate",
                toml.generator_rate
            )));
        }

        Ok(Self {
            device: cli.device.or(toml.device),
            verbose: cli.verbose || toml.verbose,
            null_output: cli.null_output,
            poll_interval: Duration::from_millis(poll_interval_ms),
            generator_rate: toml.generator_rate,
            logging: toml.logging,
        })
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            verbose: self.verbose,
            poll_interval: self.poll_interval,
        }
    }
}

fn config_error(message: impl Into<String>) -> Error {
    Error::Config(widget_common::Error::Config(message.into()))
}

/// What the player does with its positional inputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Play the sine generator at `rate`
    Generator { rate: u32 },
    /// Play these WAV files in order
    Player { files: Vec<PathBuf> },
}

impl Mode {
    /// Classify the positional inputs
    ///
    /// - none: generator at `default_rate`
    /// - exactly one supported sample rate (e.g. `96000`): generator at that rate
    /// - anything else: every input is a file path
    pub fn from_inputs(inputs: &[PathBuf], default_rate: u32) -> Self {
        match inputs {
            [] => Mode::Generator { rate: default_rate },
            [single] => match parse_rate(single) {
                Some(rate) => Mode::Generator { rate },
                None => Mode::Player {
                    files: inputs.to_vec(),
                },
            },
            _ => Mode::Player {
                files: inputs.to_vec(),
            },
        }
    }
}

fn parse_rate(input: &Path) -> Option<u32> {
    input
        .to_str()
        .and_then(|s| s.parse::<u32>().ok())
        .filter(|rate| SUPPORTED_SAMPLE_RATES.contains(rate))
}
