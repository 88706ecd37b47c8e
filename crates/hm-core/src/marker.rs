use std::fs::Permissions;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::UpdateError;

/// The local record of the last release tag that was installed.
///
/// The whole file content is the tag; there is no other structure.
#[derive(Debug, Clone)]
pub struct VersionStore {
    path: PathBuf,
}

impl VersionStore {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the recorded tag. A missing file means nothing was installed yet.
    ///
    /// # Errors
    /// Returns [`UpdateError::Filesystem`] when the file exists but cannot be read.
    pub fn read_local(&self) -> Result<Option<String>, UpdateError> {
        info!("Checking local version...");
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let tag = content.trim().to_string();
                info!("Local version: {tag}");
                Ok(Some(tag))
            }
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                info!("No local version found.");
                Ok(None)
            }
            Err(error) => Err(UpdateError::filesystem(
                "failed to read version marker",
                &self.path,
                error,
            )),
        }
    }

    /// Replace the marker with exactly `tag`.
    ///
    /// The new content is written to a sibling temp file and renamed over the
    /// marker, so readers never observe a half-written tag. An existing
    /// marker keeps its permissions; a new one is created world-readable.
    ///
    /// # Errors
    /// Returns [`UpdateError::Filesystem`] on permission or disk errors.
    pub fn write_local(&self, tag: &str) -> Result<(), UpdateError> {
        let dir = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(|error| {
            UpdateError::filesystem("failed to create temporary marker file", dir, error)
        })?;
        let permissions = std::fs::metadata(&self.path)
            .map(|metadata| metadata.permissions())
            .ok()
            .or_else(new_marker_permissions);
        if let Some(permissions) = permissions {
            temp.as_file().set_permissions(permissions).map_err(|error| {
                UpdateError::filesystem("failed to set marker permissions", temp.path(), error)
            })?;
        }
        temp.write_all(tag.as_bytes())
            .and_then(|()| temp.as_file().sync_all())
            .map_err(|error| {
                UpdateError::filesystem("failed to write version marker", temp.path(), error)
            })?;
        temp.persist(&self.path).map_err(|error| {
            UpdateError::filesystem("failed to replace version marker", &self.path, error.error)
        })?;

        debug!("Wrote {tag} to {}", self.path.display());
        info!("Updated {} with new version: {tag}", self.path.display());
        Ok(())
    }
}

// Temp files start out owner-only (0600).
#[cfg(unix)]
fn new_marker_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;

    Some(Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_marker_permissions() -> Option<Permissions> {
    None
}
