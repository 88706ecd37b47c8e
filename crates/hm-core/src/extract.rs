use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::process::Command;

use crate::error::{ExtractionError, ToolInvocationError};
use crate::tools::{ArchiveTool, ToolLocator};

/// Result of trying one archiver.
#[derive(Debug)]
pub enum AttemptOutcome {
    Extracted,
    Unavailable,
    Failed(ToolInvocationError),
}

/// Unpacks the release archive with whichever archiver is installed.
pub struct Extractor {
    locator: ToolLocator,
    working_dir: PathBuf,
    timeout: Duration,
}

impl Extractor {
    #[must_use]
    pub fn new(locator: ToolLocator, working_dir: PathBuf, timeout: Duration) -> Self {
        Self {
            locator,
            working_dir,
            timeout,
        }
    }

    /// Extract `archive` into the working directory.
    ///
    /// Tools are tried in [`ArchiveTool::PREFERENCE`] order. A tool that is
    /// missing or fails is skipped; only running out of tools is an error.
    ///
    /// # Errors
    /// [`ExtractionError::ArchiveMissing`] when there is nothing to extract,
    /// [`ExtractionError::NoToolFound`] when no archiver is installed, and
    /// [`ExtractionError::AllToolsFailed`] when every located archiver failed.
    pub async fn extract(&self, archive: &Path) -> Result<ArchiveTool, ExtractionError> {
        info!("Extracting release...");
        if !archive.is_file() {
            return Err(ExtractionError::ArchiveMissing(archive.to_path_buf()));
        }
        let archive = std::path::absolute(archive).unwrap_or_else(|_| archive.to_path_buf());

        let mut failures = Vec::new();
        for tool in ArchiveTool::PREFERENCE {
            match self.attempt(tool, &archive).await {
                AttemptOutcome::Extracted => {
                    info!("Extraction with {tool} succeeded!");
                    return Ok(tool);
                }
                AttemptOutcome::Unavailable => debug!("{tool} is not installed"),
                AttemptOutcome::Failed(error) => {
                    warn!("{tool} extraction failed: {error}");
                    failures.push(error);
                }
            }
        }

        if failures.is_empty() {
            Err(ExtractionError::NoToolFound)
        } else {
            Err(ExtractionError::AllToolsFailed(failures))
        }
    }

    pub async fn attempt(&self, tool: ArchiveTool, archive: &Path) -> AttemptOutcome {
        let Some(program) = self.locator.locate(tool) else {
            return AttemptOutcome::Unavailable;
        };
        info!("Using {tool} at: {}", program.display());

        match run_tool(tool, &program, archive, &self.working_dir, self.timeout).await {
            Ok(()) => AttemptOutcome::Extracted,
            Err(error) => AttemptOutcome::Failed(error),
        }
    }
}

async fn run_tool(
    tool: ArchiveTool,
    program: &Path,
    archive: &Path,
    working_dir: &Path,
    timeout: Duration,
) -> Result<(), ToolInvocationError> {
    let spawn_error = |source| ToolInvocationError::Spawn {
        tool,
        path: program.to_path_buf(),
        source,
    };

    // stdout/stderr stay inherited so the archiver's own output is visible.
    let mut child = Command::new(program)
        .args(tool.extract_args(archive))
        .current_dir(working_dir)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(spawn_error)?;

    match tokio::time::timeout(timeout, child.wait()).await {
        Ok(Ok(status)) if status.success() => Ok(()),
        Ok(Ok(status)) => Err(ToolInvocationError::ExitStatus { tool, status }),
        Ok(Err(source)) => Err(spawn_error(source)),
        Err(_) => {
            if let Err(error) = child.kill().await {
                warn!("Failed to kill {tool} after timeout: {error}");
            }
            Err(ToolInvocationError::TimedOut { tool, timeout })
        }
    }
}
