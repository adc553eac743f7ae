//! Service factory for building command dependencies.
//!
//! Services are built from configuration values but are not part of the
//! configuration itself.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use log::debug;
use reqwest::Client;

use crate::catalog::RepositoryCatalog;
use crate::feed::FeedClient;
use crate::http::HttpClient;

use super::config::Config;

/// User agent sent with every request.
pub const USER_AGENT: &str = "nuscan-cli";

/// Build an HTTP client with the given timeout
///
/// Connecting and every read are bounded by `timeout`; JSON fetches are also
/// bounded as a whole. Artifact downloads run as long as data keeps arriving.
pub fn build_http_client(timeout: Duration) -> Result<HttpClient> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(timeout)
        .read_timeout(timeout)
        .build()?;
    debug!("HTTP client configured with {:?} timeout", timeout);

    Ok(HttpClient::new(client).with_request_timeout(timeout))
}

/// Build a feed client that fetches through `http`
pub fn build_feed_client(http: &HttpClient) -> FeedClient {
    FeedClient::new(Arc::new(http.clone()))
}

/// Container for the services a command needs.
pub struct Services {
    pub http: HttpClient,
    pub feed: FeedClient,
    pub catalog: RepositoryCatalog,
}

impl Services {
    /// Build services from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = build_http_client(config.timeout)?;
        let feed = build_feed_client(&http);
        Ok(Self {
            http,
            feed,
            catalog: RepositoryCatalog::builtin(),
        })
    }
}
