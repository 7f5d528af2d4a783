//! Error types for CLI operations.

use std::path::PathBuf;

use dispatcher::RoutingError;
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {}", path.display())]
    ConfigNotFound { path: PathBuf },

    /// Input stream could not be opened
    #[error("Failed to open input {input}: {source}")]
    InputOpen {
        input: String,
        #[source]
        source: std::io::Error,
    },

    /// Input stream failed mid-way
    #[error("Failed to read input: {0}")]
    InputRead(#[source] std::io::Error),

    /// Channels, consumers or routing table could not be built
    #[error("Failed to build router: {0}")]
    RouterSetup(#[from] RoutingError),

    /// Metrics exporter could not be installed
    #[error("Failed to start metrics endpoint: {0}")]
    Metrics(#[source] anyhow::Error),
}

impl CliError {
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn input_open(input: impl ToString, source: std::io::Error) -> Self {
        Self::InputOpen {
            input: input.to_string(),
            source,
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
