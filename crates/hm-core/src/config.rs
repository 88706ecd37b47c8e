use std::path::PathBuf;
use std::time::Duration;

use crate::error::UpdateError;

pub const DEFAULT_REPO_OWNER: &str = "DataCluster0";
pub const DEFAULT_REPO_NAME: &str = "HeatedMetal";
pub const DEFAULT_ASSET_NAME: &str = "HeatedMetal.7z";
pub const DEFAULT_MARKER_FILE: &str = "versions.txt";
pub const DEFAULT_GAME_EXECUTABLE: &str = "RainbowSix.exe";
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";
pub const DEFAULT_DOWNLOAD_BASE_URL: &str = "https://github.com";

/// Fixed settings for one updater run.
///
/// Built once at startup and only ever borrowed afterwards.
#[derive(Debug, Clone)]
pub struct UpdaterConfig {
    pub repo_owner: String,
    pub repo_name: String,
    pub asset_name: String,
    pub marker_file_name: String,
    pub api_base_url: String,
    pub download_base_url: String,
    pub install_dir: PathBuf,
    pub game_executable: String,
    pub verify_install_dir: bool,
    pub keep_archive: bool,
    pub user_agent: String,
    pub http_timeout: Duration,
    pub connect_timeout: Duration,
    pub download_stall_timeout: Duration,
    pub extract_timeout: Duration,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            repo_owner: DEFAULT_REPO_OWNER.to_string(),
            repo_name: DEFAULT_REPO_NAME.to_string(),
            asset_name: DEFAULT_ASSET_NAME.to_string(),
            marker_file_name: DEFAULT_MARKER_FILE.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            download_base_url: DEFAULT_DOWNLOAD_BASE_URL.to_string(),
            install_dir: PathBuf::from("."),
            game_executable: DEFAULT_GAME_EXECUTABLE.to_string(),
            verify_install_dir: false,
            keep_archive: true,
            user_agent: concat!("hm-updater/", env!("CARGO_PKG_VERSION")).to_string(),
            http_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(10),
            download_stall_timeout: Duration::from_mins(1),
            extract_timeout: Duration::from_mins(30),
        }
    }
}

impl UpdaterConfig {
    #[must_use]
    pub fn marker_path(&self) -> PathBuf {
        self.install_dir.join(&self.marker_file_name)
    }

    #[must_use]
    pub fn archive_path(&self) -> PathBuf {
        self.install_dir.join(&self.asset_name)
    }

    #[must_use]
    pub fn latest_release_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/releases/latest",
            self.api_base_url.trim_end_matches('/'),
            self.repo_owner,
            self.repo_name
        )
    }

    #[must_use]
    pub fn download_url(&self, tag: &str) -> String {
        format!(
            "{}/{}/{}/releases/download/{tag}/{}",
            self.download_base_url.trim_end_matches('/'),
            self.repo_owner,
            self.repo_name,
            self.asset_name
        )
    }

    /// Check that the install directory holds the game when verification is on.
    ///
    /// # Errors
    /// Returns [`UpdateError::InvalidInstallDir`] when `verify_install_dir` is
    /// set and the game executable is not present.
    pub fn validate_install_dir(&self) -> Result<(), UpdateError> {
        if !self.verify_install_dir {
            return Ok(());
        }
        let expected = self.install_dir.join(&self.game_executable);
        if expected.is_file() {
            Ok(())
        } else {
            Err(UpdateError::InvalidInstallDir {
                dir: self.install_dir.clone(),
                expected: self.game_executable.clone(),
            })
        }
    }
}
