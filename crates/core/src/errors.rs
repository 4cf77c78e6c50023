//! Core error types for the Leadflow engine.
//!
//! This module defines transport-agnostic error types. HTTP client errors
//! (from reqwest, etc.) are converted to these types by the connect layer.

use thiserror::Error;

use crate::campaigns::CampaignError;
use crate::imports::ImportError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the lead engine.
///
/// Three families are kept apart: transport failures, client-side validation
/// failures raised before any request, and business-rule failures whose
/// human-readable message comes from the backend.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The backend answered with a non-2xx status.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("{0}")]
    Import(#[from] ImportError),

    #[error("{0}")]
    Campaign(#[from] CampaignError),

    #[error("Failed to read CSV: {0}")]
    Csv(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Invalid configuration value: {0}")]
    InvalidConfigValue(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    /// Builds an API error from a status code and backend message.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Error::Api {
            status,
            message: message.into(),
        }
    }

    /// True when the failure came from the network layer rather than the backend.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}

/// Validation errors for user input, raised client-side before any request.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("File '{0}' is empty")]
    EmptyFile(String),

    #[error("File '{name}' is {size} bytes, the limit is {limit} bytes")]
    FileTooLarge { name: String, size: u64, limit: u64 },

    #[error("File '{0}' is not a CSV file")]
    UnsupportedFileType(String),
}

// === From implementations for common error types ===

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Unexpected(format!("JSON error: {}", err))
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Csv(err.to_string())
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
