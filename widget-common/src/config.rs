//! Configuration loading and config file resolution
//!
//! Config file discovery follows a fixed priority order:
//! 1. Explicit path from the command line (highest priority)
//! 2. `WIDGET_CONFIG` environment variable
//! 3. Per-user config directory (`<config dir>/widget/config.toml`)
//! 4. System-wide `/etc/widget/config.toml` (Linux only)
//!
//! Explicitly requested files must exist and parse. Discovered files are
//! optional: when none is found the built-in defaults are used.

use crate::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variable naming a config file
pub const CONFIG_ENV_VAR: &str = "WIDGET_CONFIG";

/// Default wait between stop/skip polls while a file plays
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Default signal generator sample rate
pub const DEFAULT_GENERATOR_RATE: u32 = 48_000;

/// Bootstrap configuration loaded from TOML file
///
/// Every field has a built-in default, so an empty file is valid.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TomlConfig {
    /// Output device name (None = system default device)
    #[serde(default)]
    pub device: Option<String>,

    /// Print per-file header diagnostics
    #[serde(default)]
    pub verbose: bool,

    /// Stop/skip poll interval in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Sample rate used by the signal generator when none is given
    #[serde(default = "default_generator_rate")]
    pub generator_rate: u32,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_generator_rate() -> u32 {
    DEFAULT_GENERATOR_RATE
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            device: None,
            verbose: false,
            poll_interval_ms: default_poll_interval_ms(),
            generator_rate: default_generator_rate(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|source| Error::TomlParse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Read and parse a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content, path)
    }
}

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    /// `--config` on the command line
    CommandLine(PathBuf),
    /// `WIDGET_CONFIG` environment variable
    Environment(PathBuf),
    /// Discovered in a user or system config directory
    Discovered(PathBuf),
    /// No file found; built-in defaults
    Defaults,
}

impl fmt::Display for ConfigOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigOrigin::CommandLine(p) => write!(f, "{} (command line)", p.display()),
            ConfigOrigin::Environment(p) => write!(f, "{} ({})", p.display(), CONFIG_ENV_VAR),
            ConfigOrigin::Discovered(p) => write!(f, "{}", p.display()),
            ConfigOrigin::Defaults => write!(f, "built-in defaults"),
        }
    }
}

impl ConfigOrigin {
    /// One-line startup message describing this origin
    ///
    /// `load_config` runs before logging is initialized, so callers log
    /// this once the subscriber is installed.
    pub fn summary(&self) -> String {
        match self {
            ConfigOrigin::Defaults => "No config file found, using built-in defaults".to_string(),
            other => format!("Loaded configuration from {}", other),
        }
    }
}

/// Locate the config file to use, without reading it
///
/// Returns `ConfigOrigin::Defaults` when no candidate exists. Explicit and
/// environment paths are returned even if missing; `load_config` reports them.
pub fn resolve_config_path(explicit: Option<&Path>) -> ConfigOrigin {
    // Priority 1: Command-line argument
    if let Some(path) = explicit {
        return ConfigOrigin::CommandLine(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.is_empty() {
            return ConfigOrigin::Environment(PathBuf::from(path));
        }
    }

    // Priority 3/4: well-known locations
    default_config_candidates()
        .into_iter()
        .find(|p| p.exists())
        .map(ConfigOrigin::Discovered)
        .unwrap_or(ConfigOrigin::Defaults)
}

/// Well-known config file locations for the platform, highest priority first
pub fn default_config_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("widget").join("config.toml"));
    }

    if cfg!(target_os = "linux") {
        candidates.push(PathBuf::from("/etc/widget/config.toml"));
    }

    candidates
}

/// Resolve and load the bootstrap configuration
///
/// Graceful degradation: if no config file exists anywhere, defaults are
/// returned. A file named explicitly (flag or env var) must be readable.
pub fn load_config(explicit: Option<&Path>) -> Result<(TomlConfig, ConfigOrigin)> {
    let origin = resolve_config_path(explicit);

    let config = match &origin {
        ConfigOrigin::CommandLine(path)
        | ConfigOrigin::Environment(path)
        | ConfigOrigin::Discovered(path) => TomlConfig::from_file(path)?,
        ConfigOrigin::Defaults => TomlConfig::default(),
    };

    Ok((config, origin))
}
