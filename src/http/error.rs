//! Classification of failed HTTP fetches.

use reqwest::StatusCode;
use thiserror::Error;

/// Why a fetch produced no usable document.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request did not complete within the configured timeout.
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    /// Connection, TLS or other transport failure.
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },

    /// The body is not JSON.
    #[error("{url} did not return valid JSON: {message}")]
    InvalidJson { url: String, message: String },

    /// The body is JSON but does not have the expected shape.
    #[error("Unexpected response from {url}: {message}")]
    InvalidResponse { url: String, message: String },
}

impl FetchError {
    /// Classify a transport-level reqwest error for the given URL.
    pub fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        let url = url.to_string();
        if error.is_timeout() {
            FetchError::Timeout { url }
        } else if let Some(status) = error.status() {
            FetchError::Status { url, status }
        } else {
            FetchError::Request { url, source: error }
        }
    }
}
