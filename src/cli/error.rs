//! CLI-specific error types

use crate::database::DatabaseError;
use crate::import::ImportError;
use std::path::PathBuf;
use thiserror::Error;

/// CLI-specific error type
#[derive(Error, Debug)]
pub enum CliError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to write file {0}: {1}")]
    FileWriteError(PathBuf, String),

    #[error("Selection error: {0}")]
    SelectionError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Import error: {0}")]
    ImportError(#[from] ImportError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
