//! Error types for descriptor construction and configuration.
//!
//! Resolution itself never fails. Errors only arise at the boundary, where
//! Kubernetes objects and process configuration are turned into inputs.

use thiserror::Error;

/// Error type for proxy-inject operations
#[derive(Error, Debug)]
pub enum Error {
    /// Missing required field in a Kubernetes object
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error reading input
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the error points at a bug in the caller rather than bad user input
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Error::MissingField(_))
    }
}

/// Result type alias for proxy-inject operations
pub type Result<T> = std::result::Result<T, Error>;
