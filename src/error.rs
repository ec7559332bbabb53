//! Error types for storage and the application entry point.

use std::io;
use thiserror::Error;

/// Failure at the durable-storage boundary.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that stop the front end or its setup; the task store itself never fails.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),
}
