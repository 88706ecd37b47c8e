use log::{debug, info};
use serde::Deserialize;

use crate::config::UpdaterConfig;
use crate::error::UpdateError;

/// The subset of the release API payload the updater reads.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRelease {
    pub tag_name: String,
}

/// Latest release tag plus the derived location of its archive. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseDescriptor {
    pub tag: String,
    pub download_url: String,
}

pub struct ReleaseClient<'a> {
    client: reqwest::Client,
    config: &'a UpdaterConfig,
}

impl<'a> ReleaseClient<'a> {
    #[must_use]
    pub fn new(client: reqwest::Client, config: &'a UpdaterConfig) -> Self {
        Self { client, config }
    }

    /// Fetch the tag of the latest published release.
    ///
    /// # Errors
    /// Returns a network error when the API is unreachable, times out or
    /// answers with a non-success status, and
    /// [`UpdateError::MalformedResponse`] when the body has no usable tag.
    pub async fn latest_tag(&self) -> Result<String, UpdateError> {
        let url = self.config.latest_release_url();
        info!("Fetching latest release information from {url}");

        let request = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .timeout(self.config.http_timeout)
            .send();
        let response = request.await.map_err(|error| {
            if error.is_timeout() {
                UpdateError::TimedOut {
                    context: "release lookup",
                    timeout: self.config.http_timeout,
                }
            } else {
                UpdateError::network("failed to reach release API", error)
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_snippet = response
                .text()
                .await
                .ok()
                .map(|body| response_snippet(&body, 160))
                .unwrap_or_default();
            return Err(UpdateError::HttpStatus {
                context: "release lookup",
                status,
                body_snippet,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|error| UpdateError::network("failed to read release response", error))?;
        let tag = parse_latest_tag(&body)?;

        info!("Latest release tag: {tag}");
        Ok(tag)
    }

    /// Fetch the latest tag and derive where its archive can be downloaded.
    ///
    /// # Errors
    /// Same as [`ReleaseClient::latest_tag`].
    pub async fn latest_release(&self) -> Result<ReleaseDescriptor, UpdateError> {
        let tag = self.latest_tag().await?;
        let download_url = self.config.download_url(&tag);
        debug!("Release {tag} archive: {download_url}");
        Ok(ReleaseDescriptor { tag, download_url })
    }
}

fn parse_latest_tag(body: &str) -> Result<String, UpdateError> {
    let release: GitHubRelease = serde_json::from_str(body)
        .map_err(|error| UpdateError::MalformedResponse(error.to_string()))?;

    let tag = release.tag_name.trim();
    if tag.is_empty() {
        return Err(UpdateError::MalformedResponse(
            "tag_name is empty".to_string(),
        ));
    }
    Ok(tag.to_string())
}

fn response_snippet(body: &str, max_chars: usize) -> String {
    let snippet: String = body.chars().take(max_chars).collect();
    if snippet.is_empty() {
        String::new()
    } else {
        format!(": {snippet}")
    }
}
