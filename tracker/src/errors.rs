//! Error types for the Harbor Master tracker

use thiserror::Error;

use crate::diagnostics::DeployFailure;

/// Main error type for the tracker
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Backend error ({status}): {detail}")]
    BackendError {
        status: http::StatusCode,
        detail: String,
    },

    #[error("Deployment rejected: {0}")]
    DeployRejected(DeployFailure),

    #[error("Stream error: {0}")]
    StreamError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Shutdown error: {0}")]
    ShutdownError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for TrackerError {
    fn from(err: anyhow::Error) -> Self {
        TrackerError::Internal(err.to_string())
    }
}
