//! Archive fetcher: the download seam of the installer.

use async_trait::async_trait;
use log::info;
use std::path::Path;

use crate::error::Error;
use crate::http::HttpClient;
use crate::runtime::Runtime;

/// Retrieves a remote archive into a local file. One attempt per call; a
/// failed fetch surfaces immediately to the installer, which aborts the
/// install with nothing committed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, Error>;
}

/// Fetcher backed by the HTTP client, writing through the runtime.
pub struct HttpFetcher<'a, R: Runtime> {
    runtime: &'a R,
    client: HttpClient,
}

impl<'a, R: Runtime> HttpFetcher<'a, R> {
    pub fn new(runtime: &'a R, client: HttpClient) -> Self {
        Self { runtime, client }
    }
}

#[async_trait]
impl<R: Runtime> Fetch for HttpFetcher<'_, R> {
    #[tracing::instrument(skip(self, dest))]
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, Error> {
        info!("Downloading archive from {}...", url);

        let dest = dest.to_path_buf();
        let bytes = self
            .client
            .download_file(url, || self.runtime.create_file(&dest))
            .await?;

        info!("Download complete ({} bytes).", bytes);
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::RealRuntime;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_fetch_writes_archive() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/pyramath.zip")
            .with_status(200)
            .with_body("zip bytes")
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let dest = dir.path().join("pyramath.zip");

        let runtime = RealRuntime;
        let fetcher = HttpFetcher::new(&runtime, HttpClient::with_default_timeout().unwrap());
        let bytes = fetcher
            .fetch(&format!("{}/pyramath.zip", url), &dest)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(bytes, 9);
        assert_eq!(fs::read_to_string(&dest).unwrap(), "zip bytes");
    }

    #[tokio::test]
    async fn test_fetch_failure_surfaces_url() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/pyramath.zip")
            .with_status(500)
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let dest = dir.path().join("pyramath.zip");

        let runtime = RealRuntime;
        let fetcher = HttpFetcher::new(&runtime, HttpClient::with_default_timeout().unwrap());
        let result = fetcher.fetch(&format!("{}/pyramath.zip", url), &dest).await;

        mock.assert_async().await;
        match result {
            Err(Error::Fetch { url: failed, .. }) => {
                assert!(failed.ends_with("/pyramath.zip"))
            }
            other => panic!("Expected Fetch error, got {:?}", other.map(|_| ())),
        }
    }
}
