//! Update-and-extraction workflow for the Heated Metal release archive.
//!
//! The pieces, leaf first:
//! - [`ToolLocator`] finds an installed archiver (`WinRAR`, then `7-Zip`).
//! - [`VersionStore`] reads and writes the one-line version marker.
//! - [`ReleaseClient`] asks the release API for the latest tag.
//! - [`Downloader`] streams the release archive to disk.
//! - [`Extractor`] runs the located archivers in fallback order.
//! - [`Updater`] sequences all of the above for a single run.

mod config;
mod download;
mod error;
mod extract;
mod marker;
mod release;
mod tools;
mod updater;

#[cfg(test)]
mod test_support;

pub use config::UpdaterConfig;
pub use download::{DownloadProgress, Downloader};
pub use error::{ExtractionError, ToolInvocationError, UpdateError};
pub use extract::{AttemptOutcome, Extractor};
pub use marker::VersionStore;
pub use release::{GitHubRelease, ReleaseClient, ReleaseDescriptor};
pub use tools::{ArchiveTool, ToolLocator};
pub use updater::{ArchiveDownloader, ArchiveExtractor, ReleaseSource, UpdateOutcome, Updater};

/// Build the HTTP client shared by the release and download steps.
///
/// # Errors
/// Returns an error when the TLS backend cannot be initialised.
pub fn http_client(config: &UpdaterConfig) -> Result<reqwest::Client, UpdateError> {
    reqwest::Client::builder()
        .user_agent(config.user_agent.clone())
        .connect_timeout(config.connect_timeout)
        .build()
        .map_err(|source| UpdateError::Network {
            context: "failed to build HTTP client",
            source,
        })
}
