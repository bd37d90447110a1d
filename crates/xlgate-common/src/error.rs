//! Error types for xlgate

use thiserror::Error;

/// Result type alias for xlgate operations
pub type Result<T> = std::result::Result<T, XlgateError>;

/// Main error type for xlgate
#[derive(Error, Debug)]
pub enum XlgateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Workbook parse error: {0}")]
    Parse(String),

    #[error("Notification error: {0}")]
    Notify(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}
