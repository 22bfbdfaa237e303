use std::time::Duration;

use reqwest::StatusCode;
use tracing::{debug, error};
use url::Url;

use crate::error::FetchError;

pub const CONNECT_TIMEOUT_MS: u64 = 15_000;
pub const READ_TIMEOUT_MS: u64 = 10_000;

/// Thin GET-only wrapper around a shared [reqwest::Client].
///
/// Cloning is cheap and clones share the connection pool, so one fetcher can
/// be handed to every background task.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    pub fn new(connect_timeout: Duration, read_timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .read_timeout(read_timeout)
            .build()?;
        Ok(Self { client })
    }

    async fn get(&self, url: Url) -> Result<reqwest::Response, FetchError> {
        debug!("GET {url}");
        let response = self.client.get(url).send().await.map_err(|e| {
            error!("Error while attempting HTTP connection: {e}");
            FetchError::Transport(e)
        })?;
        if response.status() != StatusCode::OK {
            error!("HTTP error {}", response.status().as_u16());
            return Err(FetchError::Status(response.status().as_u16()));
        }
        Ok(response)
    }

    /// Fetch `url` as text with all line terminators removed.
    pub async fn get_text(&self, url: Url) -> Result<String, FetchError> {
        let body = self.get_bytes(url).await?;
        Ok(join_lines(&String::from_utf8_lossy(&body)))
    }

    pub async fn get_bytes(&self, url: Url) -> Result<Vec<u8>, FetchError> {
        let response = self.get(url).await?;
        let body = response.bytes().await.map_err(|e| {
            error!("Error while reading response body: {e}");
            FetchError::Transport(e)
        })?;
        Ok(body.to_vec())
    }
}

/// Concatenate the lines of `body` without separators. `\n`, `\r\n` and a
/// lone `\r` all end a line.
pub fn join_lines(body: &str) -> String {
    body.chars().filter(|c| !matches!(c, '\n' | '\r')).collect()
}
