//! Error handling for the API transport

use reqwest::StatusCode;
use thiserror::Error;

use bridgecheck_core::ConfigError;

/// API transport error types
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to serialize message: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The API answered with anything other than 200 OK.
    #[error("Failed to POST message to the API: {status}\n{body}")]
    Rejected { status: StatusCode, body: String },
}

/// Result type for API operations
pub type Result<T> = std::result::Result<T, ApiError>;
