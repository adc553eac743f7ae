//! HTTP client used for feed queries and package downloads.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use std::io::Write;
use std::time::Duration;

use super::{FetchError, JsonFetcher};

/// Thin wrapper over a configured reqwest [`Client`].
///
/// Connect and read timeouts come from the wrapped client. JSON fetches may
/// additionally be bounded by a total deadline; artifact downloads are not,
/// so a large package keeps streaming as long as data arrives. Nothing is
/// retried.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    request_timeout: Option<Duration>,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            request_timeout: None,
        }
    }

    /// Bound every JSON fetch by a total deadline.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Returns a reference to the underlying reqwest Client.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Downloads a file from a URL into the writer produced by `create_writer`.
    ///
    /// The writer is only created once the server has answered with a success
    /// status. A body that fails midway leaves whatever was written; callers
    /// own the cleanup.
    #[tracing::instrument(skip(self, create_writer))]
    pub async fn download_file<W, F>(&self, url: &str, create_writer: F) -> Result<u64>
    where
        W: Write,
        F: FnOnce() -> Result<W>,
    {
        debug!("Downloading file from {}...", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            }
            .into());
        }

        let mut response = response;
        let mut writer = create_writer()?;
        let mut downloaded_bytes: u64 = 0;

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))
            .context("Failed to read chunk from download stream")?
        {
            writer
                .write_all(&chunk)
                .context("Failed to write chunk to file")?;
            downloaded_bytes += chunk.len() as u64;
        }
        writer.flush().context("Failed to flush downloaded file")?;

        debug!(
            "Downloaded {:.2} MB",
            downloaded_bytes as f64 / (1024.0 * 1024.0)
        );

        Ok(downloaded_bytes)
    }
}

#[async_trait]
impl JsonFetcher for HttpClient {
    #[tracing::instrument(skip(self))]
    async fn fetch_json(&self, url: &str) -> Result<serde_json::Value, FetchError> {
        debug!("GET JSON from {}...", url);

        let mut request = self.client.get(url);
        if let Some(timeout) = self.request_timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        serde_json::from_slice(&body).map_err(|e| FetchError::InvalidJson {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_json_success() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/v3/index.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"version": "3.0.0", "resources": []}"#)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let value = client
            .fetch_json(&format!("{}/v3/index.json", url))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(value["version"], "3.0.0");
        assert!(value["resources"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_json_with_query_string() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/query?q=Foo&prerelease=true")
            .with_status(200)
            .with_body(r#"{"data": []}"#)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let value = client
            .fetch_json(&format!("{}/query?q=Foo&prerelease=true", url))
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(value["data"].is_array());
    }

    #[tokio::test]
    async fn test_fetch_json_not_found() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/missing.json")
            .with_status(404)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let result = client.fetch_json(&format!("{}/missing.json", url)).await;

        mock.assert_async().await;
        assert!(matches!(
            result,
            Err(FetchError::Status {
                status: reqwest::StatusCode::NOT_FOUND,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_fetch_json_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/flaky.json")
            .with_status(500)
            .expect(1)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let result = client.fetch_json(&format!("{}/flaky.json", url)).await;

        mock.assert_async().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_fetch_json_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/broken.json")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let result = client.fetch_json(&format!("{}/broken.json", url)).await;

        mock.assert_async().await;
        assert!(matches!(result, Err(FetchError::InvalidJson { .. })));
    }

    #[tokio::test]
    async fn test_fetch_json_connection_refused() {
        let client = HttpClient::new(
            Client::builder()
                .timeout(Duration::from_secs(5))
                .build()
                .unwrap(),
        );
        let result = client.fetch_json("http://127.0.0.1:1/index.json").await;

        assert!(matches!(
            result,
            Err(FetchError::Request { .. }) | Err(FetchError::Timeout { .. })
        ));
    }

    #[tokio::test]
    async fn test_download_file_success() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/foo/1.0.0/foo.1.0.0.nupkg")
            .with_status(200)
            .with_body("test content")
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let bytes = client
            .download_file(&format!("{}/foo/1.0.0/foo.1.0.0.nupkg", url), || {
                Ok(std::io::sink())
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(bytes, 12); // "test content" is 12 bytes
    }

    #[tokio::test]
    async fn test_download_file_not_found_does_not_create_writer() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/file.nupkg")
            .with_status(404)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let result = client
            .download_file(&format!("{}/file.nupkg", url), || -> Result<std::io::Sink> {
                panic!("writer must not be created for a failed download")
            })
            .await;

        mock.assert_async().await;
        let err = result.unwrap_err();
        assert!(err.downcast_ref::<FetchError>().is_some());
    }

    #[tokio::test]
    async fn test_fetch_json_stalled_body_times_out() {
        let mut server = mockito::Server::new_async().await;
        let url = format!("{}/slow.json", server.url());

        let _mock = server
            .mock("GET", "/slow.json")
            .with_status(200)
            .with_chunked_body(|w| {
                w.write_all(b"{\"resources\": [")?;
                w.flush()?;
                std::thread::sleep(Duration::from_secs(3));
                w.write_all(b"]}")
            })
            .create_async()
            .await;

        let client = HttpClient::new(Client::new()).with_request_timeout(Duration::from_secs(1));
        let started = std::time::Instant::now();
        let result = client.fetch_json(&url).await;

        assert!(matches!(result, Err(FetchError::Timeout { url: ref u }) if *u == url));
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_download_file_not_bound_by_request_timeout() {
        let mut server = mockito::Server::new_async().await;
        let url = format!("{}/big.nupkg", server.url());

        let _mock = server
            .mock("GET", "/big.nupkg")
            .with_status(200)
            .with_chunked_body(|w| {
                w.write_all(b"first")?;
                w.flush()?;
                std::thread::sleep(Duration::from_millis(1500));
                w.write_all(b"second")
            })
            .create_async()
            .await;

        let client = HttpClient::new(Client::new()).with_request_timeout(Duration::from_secs(1));
        let bytes = client
            .download_file(&url, || Ok(std::io::sink()))
            .await
            .unwrap();

        assert_eq!(bytes, 11);
    }
}
