//! HTTP client for downloading archives.
//!
//! A single GET per call: a failed transfer surfaces immediately to the
//! installer, which reports it and aborts that install. The whole transfer
//! runs under a bounded timeout so a stalled server cannot hang the caller.

use anyhow::{Context, Result};
use log::debug;
use reqwest::Client;
use std::io::Write;
use std::time::Duration;

use crate::error::Error;

/// Bound on one whole transfer, connect included.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Creates a client with [`FETCH_TIMEOUT`] applied.
    pub fn with_default_timeout() -> Result<Self> {
        let client = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::new(client))
    }

    /// Downloads a URL into a writer produced by `create_writer`.
    /// Any transport failure, timeout, or non-success status is a
    /// [`Error::Fetch`] carrying the URL.
    #[tracing::instrument(skip(self, create_writer))]
    pub async fn download_file<W, F>(&self, url: &str, create_writer: F) -> Result<u64, Error>
    where
        W: Write,
        F: Fn() -> Result<W>,
    {
        debug!("Downloading file from {}...", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_error(url, &e.to_string()))?;

        let mut response = response
            .error_for_status()
            .map_err(|e| fetch_error(url, &e.to_string()))?;

        let mut writer =
            create_writer().map_err(|e| fetch_error(url, &format!("cannot stage download: {e:#}")))?;
        let mut downloaded_bytes: u64 = 0;

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| fetch_error(url, &e.to_string()))?
        {
            writer
                .write_all(&chunk)
                .map_err(|e| fetch_error(url, &format!("cannot write download: {e}")))?;
            downloaded_bytes += chunk.len() as u64;
        }

        debug!(
            "Downloaded {:.2} MB",
            downloaded_bytes as f64 / (1024.0 * 1024.0)
        );

        Ok(downloaded_bytes)
    }
}

fn fetch_error(url: &str, reason: &str) -> Error {
    Error::Fetch {
        url: url.to_string(),
        reason: reason.to_string(),
    }
}
