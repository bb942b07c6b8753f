//! Tracing subscriber setup shared by the widget binaries

use crate::config::LoggingConfig;
use crate::{Error, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the default filter directives for the given crate targets
///
/// `--verbose` raises the configured level to at least `debug`.
pub fn default_directives(level: &str, verbose: bool, targets: &[&str]) -> String {
    let level = if verbose && !matches!(level, "trace" | "debug") {
        "debug"
    } else {
        level
    };

    targets
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over the configured level. When
/// `logging.file` is set, output is appended to that file instead of stderr.
pub fn init(logging: &LoggingConfig, verbose: bool, targets: &[&str]) -> Result<()> {
    let directives = default_directives(&logging.level, verbose, targets);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));

    let registry = tracing_subscriber::registry().with(filter);

    let result = match &logging.file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .try_init()
        }
        None => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init(),
    };

    result.map_err(|e| Error::Logging(e.to_string()))?;

    match &logging.file {
        Some(path) => debug!("Logging to {}", path.display()),
        None => debug!("Logging to stderr"),
    }
    Ok(())
}
