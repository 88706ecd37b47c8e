use std::path::Path;

use async_trait::async_trait;
use log::{info, warn};

use crate::config::UpdaterConfig;
use crate::download::Downloader;
use crate::error::{ExtractionError, UpdateError};
use crate::extract::Extractor;
use crate::marker::VersionStore;
use crate::release::{ReleaseClient, ReleaseDescriptor};
use crate::tools::{ArchiveTool, ToolLocator};

#[async_trait]
pub trait ReleaseSource: Send + Sync {
    async fn latest_release(&self) -> Result<ReleaseDescriptor, UpdateError>;
}

#[async_trait]
pub trait ArchiveDownloader: Send + Sync {
    async fn download(&self, url: &str, dest: &Path) -> Result<u64, UpdateError>;
}

#[async_trait]
pub trait ArchiveExtractor: Send + Sync {
    async fn extract(&self, archive: &Path) -> Result<ArchiveTool, ExtractionError>;
}

#[async_trait]
impl ReleaseSource for ReleaseClient<'_> {
    async fn latest_release(&self) -> Result<ReleaseDescriptor, UpdateError> {
        ReleaseClient::latest_release(self).await
    }
}

#[async_trait]
impl ArchiveDownloader for Downloader {
    async fn download(&self, url: &str, dest: &Path) -> Result<u64, UpdateError> {
        Downloader::download(self, url, dest).await
    }
}

#[async_trait]
impl ArchiveExtractor for Extractor {
    async fn extract(&self, archive: &Path) -> Result<ArchiveTool, ExtractionError> {
        Extractor::extract(self, archive).await
    }
}

/// How a successful run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    UpToDate {
        tag: String,
    },
    Updated {
        tag: String,
        previous: Option<String>,
        tool: ArchiveTool,
    },
}

/// Runs one update check: latest tag, compare, download, record, extract.
pub struct Updater<'a> {
    config: &'a UpdaterConfig,
    store: VersionStore,
    releases: Box<dyn ReleaseSource + 'a>,
    downloader: Box<dyn ArchiveDownloader + 'a>,
    extractor: Box<dyn ArchiveExtractor + 'a>,
}

impl<'a> Updater<'a> {
    /// Wire the production collaborators for this host.
    #[must_use]
    pub fn new(config: &'a UpdaterConfig, client: &reqwest::Client) -> Self {
        Self::with_parts(
            config,
            VersionStore::new(config.marker_path()),
            Box::new(ReleaseClient::new(client.clone(), config)),
            Box::new(Downloader::new(
                client.clone(),
                config.download_stall_timeout,
            )),
            Box::new(Extractor::new(
                ToolLocator::for_host(),
                config.install_dir.clone(),
                config.extract_timeout,
            )),
        )
    }

    #[must_use]
    pub fn with_parts(
        config: &'a UpdaterConfig,
        store: VersionStore,
        releases: Box<dyn ReleaseSource + 'a>,
        downloader: Box<dyn ArchiveDownloader + 'a>,
        extractor: Box<dyn ArchiveExtractor + 'a>,
    ) -> Self {
        Self {
            config,
            store,
            releases,
            downloader,
            extractor,
        }
    }

    /// Perform the run. The first failing step aborts the rest.
    ///
    /// The marker is written as soon as the download finishes, before
    /// extraction runs. A failed extraction therefore leaves the marker at the
    /// new tag and the next run reports "already up to date".
    ///
    /// # Errors
    /// Propagates the first error raised by any step.
    pub async fn run(&self) -> Result<UpdateOutcome, UpdateError> {
        info!("Starting update check...");
        self.config.validate_install_dir()?;

        let release = self.releases.latest_release().await?;
        let local = self.store.read_local()?;

        if local.as_deref() == Some(release.tag.as_str()) {
            info!("Already on the latest version.");
            return Ok(UpdateOutcome::UpToDate { tag: release.tag });
        }

        info!("New version available: {}", release.tag);
        let archive = self.config.archive_path();
        info!("Downloading release {}...", release.tag);
        self.downloader
            .download(&release.download_url, &archive)
            .await?;
        self.store.write_local(&release.tag)?;

        let tool = match self.extractor.extract(&archive).await {
            Ok(tool) => tool,
            Err(error) => {
                warn!(
                    "{} already records {}; delete it to retry the extraction on the next run",
                    self.store.path().display(),
                    release.tag
                );
                return Err(error.into());
            }
        };

        if !self.config.keep_archive {
            match std::fs::remove_file(&archive) {
                Ok(()) => info!("Removed {}", archive.display()),
                Err(error) => warn!("Failed to remove {}: {error}", archive.display()),
            }
        }

        Ok(UpdateOutcome::Updated {
            tag: release.tag,
            previous: local,
            tool,
        })
    }
}
