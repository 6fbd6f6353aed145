//! Error types for kotodama

use thiserror::Error;

/// The main error type for kotodama operations
#[derive(Debug, Error)]
pub enum KotodamaError {
    #[error("Capability error: {0}")]
    Capability(String),

    #[error("Asset error: {0}")]
    Asset(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid color literal: {0}")]
    InvalidColor(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for kotodama operations
pub type Result<T> = std::result::Result<T, KotodamaError>;
