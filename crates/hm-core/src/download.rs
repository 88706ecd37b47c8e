use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use log::{debug, info};
use tokio::io::AsyncWriteExt;

use crate::error::UpdateError;

/// Bytes received so far against the advertised length, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadProgress {
    pub downloaded: u64,
    pub total: Option<u64>,
}

impl DownloadProgress {
    #[must_use]
    pub fn percent(&self) -> Option<u64> {
        match self.total {
            Some(total) if total > 0 => Some((self.downloaded.min(total) * 100) / total),
            _ => None,
        }
    }
}

/// Streams release archives to disk without buffering the whole body.
pub struct Downloader {
    client: reqwest::Client,
    stall_timeout: Duration,
}

impl Downloader {
    #[must_use]
    pub fn new(client: reqwest::Client, stall_timeout: Duration) -> Self {
        Self {
            client,
            stall_timeout,
        }
    }

    /// Download `url` into `dest`, replacing any previous file.
    ///
    /// A failure part way through leaves a truncated file at `dest`; callers
    /// must treat any error as "download not usable".
    ///
    /// # Errors
    /// Returns a network error on connection failure, non-success status or a
    /// stalled stream, and a filesystem error when `dest` cannot be written.
    pub async fn download(&self, url: &str, dest: &Path) -> Result<u64, UpdateError> {
        info!("Downloading {url}");

        let response = tokio::time::timeout(self.stall_timeout, self.client.get(url).send())
            .await
            .map_err(|_| UpdateError::TimedOut {
                context: "download request",
                timeout: self.stall_timeout,
            })?
            .map_err(|error| UpdateError::network("download request failed", error))?;

        if !response.status().is_success() {
            return Err(UpdateError::HttpStatus {
                context: "download",
                status: response.status(),
                body_snippet: String::new(),
            });
        }

        let total = response.content_length();
        if total.is_none() {
            debug!("No content length reported; progress is logged at the end only");
        }
        let mut progress = DownloadProgress {
            downloaded: 0,
            total,
        };
        let mut last_reported = None;

        let mut file = tokio::fs::File::create(dest).await.map_err(|error| {
            UpdateError::filesystem("failed to create download file", dest, error)
        })?;

        let mut stream = response.bytes_stream();
        loop {
            let next = tokio::time::timeout(self.stall_timeout, stream.next())
                .await
                .map_err(|_| UpdateError::TimedOut {
                    context: "download stream",
                    timeout: self.stall_timeout,
                })?;
            let Some(chunk) = next else {
                break;
            };
            let chunk =
                chunk.map_err(|error| UpdateError::network("download stream error", error))?;
            file.write_all(&chunk).await.map_err(|error| {
                UpdateError::filesystem("failed to write download data", dest, error)
            })?;

            progress.downloaded += chunk.len() as u64;
            if let Some(percent) = progress.percent()
                && last_reported != Some(percent / 10)
            {
                last_reported = Some(percent / 10);
                info!(
                    "Downloaded {percent}% ({} / {} bytes)",
                    progress.downloaded,
                    total.unwrap_or_default()
                );
            }
        }

        file.flush().await.map_err(|error| {
            UpdateError::filesystem("failed to flush download file", dest, error)
        })?;

        info!(
            "Download complete: {} bytes written to {}",
            progress.downloaded,
            dest.display()
        );
        Ok(progress.downloaded)
    }
}
