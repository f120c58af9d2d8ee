//! Error types for the simulation harness.

use autocat_core::ConfigError;
use thiserror::Error;

/// Errors that can occur while configuring or exporting a run.
#[derive(Debug, Error)]
pub enum SimError {
    /// Reading or writing a file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON config or export could not be (de)serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The pond rejected its rules or seed counts
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Scenario name not recognised
    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),

    /// A command-line value could not be interpreted
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl SimError {
    /// Creates an invalid-argument error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}
