//! Ingestion error types

use thiserror::Error;

/// Ingestion errors
#[derive(Debug, Error)]
pub enum IngestionError {
    /// An input line could not be parsed into an event
    #[error("failed to parse event at line {line}: {message}")]
    ParseFailed { line: usize, message: String },

    /// Input could not be read
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Ingestion Result type alias
pub type Result<T> = std::result::Result<T, IngestionError>;
