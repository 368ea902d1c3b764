//! Error handling for the gateway CLI.
//!
//! This module defines the main error type `Error` used throughout the crate,
//! along with a convenient `Result` type alias. It uses `thiserror` for easy
//! error handling and implements conversions from common error types.
//!
//! The request pipeline funnels every failure mode (authentication, HTTP
//! status, parse) into `Error::Dispatch` so callers observe a single kind;
//! the original message is always preserved inside it.

use thiserror::Error;

/// Result type for gateway CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for gateway CLI operations
#[derive(Debug, Error)]
pub enum Error {
    /// Token endpoint rejected the credentials or could not be reached
    #[error("Authentication error: {status} {status_text}")]
    Auth { status: u16, status_text: String },

    /// Request pipeline failure (HTTP status, transport, or parse)
    #[error("Request error: {0}")]
    Dispatch(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input validation failure, one message per violated rule
    #[error("Validation error: {0}")]
    Validation(String),

    /// OpenAPI document error
    #[error("OpenAPI error: {0}")]
    OpenApi(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP transport error outside the dispatch pipeline
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Create a new authentication error from an HTTP status pair
    pub fn auth(status: u16, status_text: impl Into<String>) -> Self {
        Self::Auth {
            status,
            status_text: status_text.into(),
        }
    }

    /// Create a new dispatch error
    pub fn dispatch<S: Into<String>>(msg: S) -> Self {
        Self::Dispatch(msg.into())
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new OpenAPI error
    pub fn openapi<S: Into<String>>(msg: S) -> Self {
        Self::OpenApi(msg.into())
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Self::Config(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Self::Config(s)
    }
}
