//! Configuration error types

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid value for '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("Duplicate {section} id {id}")]
    DuplicateId { section: &'static str, id: u64 },

    #[error("'{field}' references unknown {target} {id}")]
    UnknownReference {
        field: String,
        target: &'static str,
        id: u64,
    },
}

impl ConfigError {
    pub(crate) fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}
