//! Error types for auro.

use thiserror::Error;

/// The main error type for auro operations.
#[derive(Debug, Error)]
pub enum AuroError {
    /// Raw text handed to us by a collaborator could not be decoded.
    #[error("Parse error in {context}: {message}")]
    Parse {
        context: &'static str,
        message: String,
    },

    /// The schema introspection collaborator failed.
    #[error("Introspection error: {0}")]
    Introspection(String),

    /// Query execution error.
    #[error("Execution error: {0}")]
    Execution(String),

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AuroError {
    /// Create a parse error for the given input kind.
    pub fn parse(context: &'static str, message: impl Into<String>) -> Self {
        Self::Parse {
            context,
            message: message.into(),
        }
    }

    /// Create an introspection error.
    pub fn introspection(message: impl Into<String>) -> Self {
        Self::Introspection(message.into())
    }

    /// Create an execution error.
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }
}

/// Result type alias for auro operations.
pub type AuroResult<T> = Result<T, AuroError>;
