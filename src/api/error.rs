//! Error types for the job server client.

use thiserror::Error;

/// Message used when a rejected start request carries no usable error body.
pub const GENERIC_START_FAILURE: &str = "Failed to start processing";

/// Error returned by job server operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure (connect, timeout, TLS, non-success status).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    /// The server refused the request and explained why.
    #[error("{message}")]
    Rejected { status: u16, message: String },
    /// Response body was not the expected JSON shape.
    #[error("invalid response: {0}")]
    Decode(#[from] serde_json::Error),
    /// Server URL or endpoint could not be built.
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// Local file I/O while saving a download.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
