//! Error hierarchy for fitexplore
//!
//! The analytics engine is infallible; these errors cover the edges of the
//! crate: decoding input files, writing exports and loading configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for all fitexplore operations
#[derive(Debug, Error)]
pub enum FitExploreError {
    /// FIT file decoding errors
    #[error("FIT parsing error: {0}")]
    FitParsing(#[from] FitError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Export errors
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// FIT file decoding errors
#[derive(Debug, Error)]
pub enum FitError {
    /// File not found at specified path
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// File is corrupted or could not be decoded
    #[error("Corrupted file: {reason}")]
    Corrupted { reason: String },

    /// Decoded file carried no record messages
    #[error("No record messages found")]
    NoRecords,
}

/// Export errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for fitexplore operations
pub type Result<T> = std::result::Result<T, FitExploreError>;

impl FitExploreError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            FitExploreError::FitParsing(FitError::FileNotFound { .. }) => ErrorSeverity::Warning,
            FitExploreError::FitParsing(FitError::NoRecords) => ErrorSeverity::Warning,
            FitExploreError::Configuration(_) => ErrorSeverity::Warning,
            _ => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            FitExploreError::FitParsing(FitError::FileNotFound { path }) => {
                format!("Could not find activity file: {}", path.display())
            }
            FitExploreError::FitParsing(FitError::Corrupted { reason }) => {
                format!("Activity file is corrupted: {}", reason)
            }
            FitExploreError::FitParsing(FitError::NoRecords) => {
                "Activity file contains no samples to analyze.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Error that prevents the operation
    Error,
    /// Warning that doesn't prevent operation
    Warning,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
        }
    }
}
