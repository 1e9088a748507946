//! CLI command implementations.

pub mod prune;
pub mod run;

use std::path::Path;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use vaultit_config::BackupConfig;

pub use prune::{list, prune};
pub use run::run;

/// Read and parse the configuration file.
pub fn load_config(path: &str) -> Result<BackupConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path))?;
    vaultit_config::parse_backup_config(&content)
        .with_context(|| format!("Failed to parse config file: {}", path))
}

pub fn validate(path: &str) -> Result<()> {
    let content = std::fs::read_to_string(path)?;
    match vaultit_config::parse_backup_config(&content) {
        Ok(_config) => {
            println!("Configuration is valid");
            Ok(())
        }
        Err(e) => {
            println!("Configuration error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Initialize tracing to stderr, or to the configured log file.
pub fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }

    Ok(())
}
