//! CLI error types

use std::io;

use brep_core::ConfigError;
use thiserror::Error;

/// Failures that stop the CLI before a response is produced
#[derive(Debug, Error)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid box: {0}")]
    InvalidBox(String),
}

pub type CliResult<T> = Result<T, CliError>;
