use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::tools::ArchiveTool;

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("{context}: {source}")]
    Network {
        context: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{context}: no response within {timeout:?}")]
    TimedOut {
        context: &'static str,
        timeout: Duration,
    },
    #[error("{context} failed with HTTP {status}{body_snippet}")]
    HttpStatus {
        context: &'static str,
        status: reqwest::StatusCode,
        body_snippet: String,
    },
    #[error("malformed release response: {0}")]
    MalformedResponse(String),
    #[error("{context} ({}): {source}", path.display())]
    Filesystem {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} does not contain {expected}", dir.display())]
    InvalidInstallDir { dir: PathBuf, expected: String },
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

impl UpdateError {
    pub(crate) fn network(context: &'static str, source: reqwest::Error) -> Self {
        Self::Network { context, source }
    }

    pub(crate) fn filesystem(context: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::Filesystem {
            context,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Whether this failure came from talking to the release host.
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::TimedOut { .. } | Self::HttpStatus { .. }
        )
    }
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("archive not found: {}", .0.display())]
    ArchiveMissing(PathBuf),
    #[error("neither WinRAR nor 7-Zip was found; install one of them and make sure it is on PATH")]
    NoToolFound,
    #[error("extraction failed with every available tool: {}", summarize(.0))]
    AllToolsFailed(Vec<ToolInvocationError>),
}

/// A single archiver run that did not succeed. Recovered by trying the next tool.
#[derive(Debug, Error)]
pub enum ToolInvocationError {
    #[error("{tool} could not be started ({}): {source}", path.display())]
    Spawn {
        tool: ArchiveTool,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{tool} exited with {status}")]
    ExitStatus {
        tool: ArchiveTool,
        status: std::process::ExitStatus,
    },
    #[error("{tool} did not finish within {timeout:?} and was killed")]
    TimedOut { tool: ArchiveTool, timeout: Duration },
}

impl ToolInvocationError {
    #[must_use]
    pub fn tool(&self) -> ArchiveTool {
        match self {
            Self::Spawn { tool, .. } | Self::ExitStatus { tool, .. } | Self::TimedOut { tool, .. } => {
                *tool
            }
        }
    }
}

fn summarize(failures: &[ToolInvocationError]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
