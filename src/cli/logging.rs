//! Tracing subscriber setup.
//!
//! `RUST_LOG` wins over the configured level. Logs go to stderr unless the
//! config names a file, so stdout stays clean for generated scripts.

use super::config::{resolve_config_path, DashvoteConfig, LoggingConfig};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
pub fn init(config_path: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let path = resolve_config_path(config_path);
    let logging = DashvoteConfig::load_or_default(&path)
        .map(|config| config.logging)
        .unwrap_or_default();

    init_with(&logging)
}

fn init_with(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .map_err(|e| format!("Invalid log level '{}': {}", logging.level, e))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match &logging.file {
        Some(file) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(file)
                .map_err(|e| format!("Failed to open log file '{}': {}", file.display(), e))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|e| format!("Failed to install logger: {}", e))?;
        }
        None => {
            builder
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|e| format!("Failed to install logger: {}", e))?;
        }
    }

    Ok(())
}
