//! HTTP client module: JSON fetching and artifact downloads.
//!
//! Every request is attempted exactly once. Failures are reported as
//! [`FetchError`] so callers can decide how far they propagate.

mod client;
mod error;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

pub use client::HttpClient;
pub use error::FetchError;

/// Fetches a URL and returns its body parsed as JSON.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JsonFetcher: Send + Sync {
    async fn fetch_json(&self, url: &str) -> Result<serde_json::Value, FetchError>;
}

/// Fetch a URL and deserialize it into a schema type.
///
/// A body that is valid JSON but does not fit `T` is a
/// [`FetchError::InvalidResponse`].
pub async fn fetch_typed<T, F>(fetcher: &F, url: &str) -> Result<T, FetchError>
where
    T: DeserializeOwned,
    F: JsonFetcher + ?Sized,
{
    let value = fetcher.fetch_json(url).await?;
    serde_json::from_value(value).map_err(|e| FetchError::InvalidResponse {
        url: url.to_string(),
        message: e.to_string(),
    })
}
