use reqwest::Client;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::download::{DownloadOutcome, DownloadProgress, DownloadTask, download_from};
use super::manifest::{UpdateInfo, parse_manifest};
use crate::error::Result;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where to look for updates and what we are running
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateConfig {
    /// URL of the `version;url` manifest
    pub manifest_url: String,
    /// Version of the running program
    pub current_version: String,
    /// Timeout applied to each request
    pub timeout: Duration,
}

impl UpdateConfig {
    pub fn new(manifest_url: impl Into<String>, current_version: impl Into<String>) -> Self {
        Self {
            manifest_url: manifest_url.into(),
            current_version: current_version.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// HTTP client for update checks and downloads
#[derive(Debug, Clone)]
pub struct UpdateClient {
    client: Client,
    config: UpdateConfig,
}

impl UpdateClient {
    pub fn new(config: UpdateConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &UpdateConfig {
        &self.config
    }

    /// Fetch and parse the manifest.
    ///
    /// Network failures and malformed manifests are logged and reported as
    /// `None`; a reachable manifest with an older version is `Some` with
    /// `available == false`.
    pub async fn check(&self) -> Option<UpdateInfo> {
        match self.fetch_manifest().await {
            Ok(text) => {
                let info = parse_manifest(&text, &self.config.current_version);
                if info.is_none() {
                    warn!(url = %self.config.manifest_url, "Malformed update manifest");
                }
                info
            }
            Err(e) => {
                warn!(url = %self.config.manifest_url, "Update check failed: {}", e);
                None
            }
        }
    }

    async fn fetch_manifest(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.config.manifest_url)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }

    /// Download `url` into memory, reporting progress on `progress`.
    pub async fn download(
        &self,
        url: &str,
        cancel: &CancellationToken,
        progress: &mpsc::UnboundedSender<DownloadProgress>,
    ) -> Result<DownloadOutcome> {
        debug!(url, "starting download");
        let response = self.client.get(url).send().await?.error_for_status()?;
        download_from(response, cancel, progress).await
    }

    /// Run [`download`](Self::download) on a background task.
    pub fn spawn_download(&self, url: impl Into<String>, cancel: CancellationToken) -> DownloadTask {
        let client = self.clone();
        let url = url.into();
        DownloadTask::spawn(move |progress| async move {
            client.download(&url, &cancel, &progress).await
        })
    }
}
