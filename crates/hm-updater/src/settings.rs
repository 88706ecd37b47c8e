use std::path::{Path, PathBuf};
use std::time::Duration;

use hm_core::UpdaterConfig;
use hm_platform::AppPaths;
use serde::Deserialize;
use thiserror::Error;

use crate::cli::Args;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{field} in {} must be at least 1 second", path.display())]
    ZeroTimeout { path: PathBuf, field: &'static str },
}

/// On-disk overrides for [`UpdaterConfig`]. Every field is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub repo_owner: String,
    pub repo_name: String,
    pub asset_name: String,
    pub marker_file: String,
    pub api_base_url: String,
    pub download_base_url: String,
    pub install_dir: Option<PathBuf>,
    pub game_executable: String,
    pub verify_game_dir: bool,
    pub keep_archive: bool,
    pub http_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub download_stall_timeout_secs: u64,
    pub extract_timeout_secs: u64,
    pub debug_logging: bool,
    pub max_log_size_bytes: u64,
}

pub const DEFAULT_MAX_LOG_SIZE_BYTES: u64 = 5 * 1024 * 1024;

impl Default for Settings {
    fn default() -> Self {
        let config = UpdaterConfig::default();
        Self {
            repo_owner: config.repo_owner,
            repo_name: config.repo_name,
            asset_name: config.asset_name,
            marker_file: config.marker_file_name,
            api_base_url: config.api_base_url,
            download_base_url: config.download_base_url,
            install_dir: None,
            game_executable: config.game_executable,
            verify_game_dir: config.verify_install_dir,
            keep_archive: config.keep_archive,
            http_timeout_secs: config.http_timeout.as_secs(),
            connect_timeout_secs: config.connect_timeout.as_secs(),
            download_stall_timeout_secs: config.download_stall_timeout.as_secs(),
            extract_timeout_secs: config.extract_timeout.as_secs(),
            debug_logging: false,
            max_log_size_bytes: DEFAULT_MAX_LOG_SIZE_BYTES,
        }
    }
}

impl Settings {
    /// Load settings from `explicit`, or from the per-user settings file.
    ///
    /// A missing per-user file yields defaults; a missing explicit file is an
    /// error.
    ///
    /// # Errors
    /// Returns an error when the file cannot be read or is not valid JSON.
    pub fn load(explicit: Option<&Path>) -> Result<Self, SettingsError> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        let Ok(paths) = AppPaths::new() else {
            return Ok(Self::default());
        };
        let path = paths.settings_file();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self =
            serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        if let Some(field) = settings.zero_timeout() {
            return Err(SettingsError::ZeroTimeout {
                path: path.to_path_buf(),
                field,
            });
        }
        Ok(settings)
    }

    fn zero_timeout(&self) -> Option<&'static str> {
        [
            ("http_timeout_secs", self.http_timeout_secs),
            ("connect_timeout_secs", self.connect_timeout_secs),
            ("download_stall_timeout_secs", self.download_stall_timeout_secs),
            ("extract_timeout_secs", self.extract_timeout_secs),
        ]
        .into_iter()
        .find_map(|(field, secs)| (secs == 0).then_some(field))
    }

    /// Combine these settings with command-line overrides.
    #[must_use]
    pub fn into_config(self, args: &Args) -> UpdaterConfig {
        let defaults = UpdaterConfig::default();
        UpdaterConfig {
            repo_owner: self.repo_owner,
            repo_name: self.repo_name,
            asset_name: self.asset_name,
            marker_file_name: self.marker_file,
            api_base_url: self.api_base_url,
            download_base_url: self.download_base_url,
            install_dir: args
                .dir
                .clone()
                .or(self.install_dir)
                .unwrap_or(defaults.install_dir),
            game_executable: self.game_executable,
            verify_install_dir: args.verify_game_dir || self.verify_game_dir,
            keep_archive: self.keep_archive && !args.remove_archive,
            user_agent: defaults.user_agent,
            http_timeout: Duration::from_secs(self.http_timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            download_stall_timeout: Duration::from_secs(self.download_stall_timeout_secs),
            extract_timeout: Duration::from_secs(self.extract_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::time::Duration;

    use serde_json::json;

    use super::{Settings, SettingsError};
    use crate::cli::Args;

    #[test]
    fn defaults_match_updater_defaults() {
        let config = Settings::default().into_config(&Args::default());

        assert_eq!(config.repo_owner, "DataCluster0");
        assert_eq!(config.repo_name, "HeatedMetal");
        assert_eq!(config.asset_name, "HeatedMetal.7z");
        assert_eq!(config.marker_file_name, "versions.txt");
        assert_eq!(config.install_dir, Path::new("."));
        assert!(config.keep_archive);
        assert!(!config.verify_install_dir);
        assert_eq!(config.http_timeout, Duration::from_secs(10));
        assert_eq!(config.extract_timeout, Duration::from_mins(30));
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let settings: Settings = serde_json::from_value(json!({
            "asset_name": "HeatedMetal-lite.7z",
            "extract_timeout_secs": 60
        }))
        .expect("partial settings should deserialize");

        assert_eq!(settings.asset_name, "HeatedMetal-lite.7z");
        assert_eq!(settings.extract_timeout_secs, 60);
        assert_eq!(settings.repo_name, "HeatedMetal");
        assert_eq!(settings.marker_file, "versions.txt");
    }

    #[test]
    fn cli_flags_override_settings() {
        let settings = Settings {
            install_dir: Some("/from/settings".into()),
            keep_archive: true,
            ..Settings::default()
        };
        let args = Args {
            dir: Some("/from/cli".into()),
            remove_archive: true,
            verify_game_dir: true,
            ..Args::default()
        };

        let config = settings.into_config(&args);

        assert_eq!(config.install_dir, Path::new("/from/cli"));
        assert!(!config.keep_archive);
        assert!(config.verify_install_dir);
    }

    #[test]
    fn settings_install_dir_used_without_cli_dir() {
        let settings = Settings {
            install_dir: Some("/from/settings".into()),
            ..Settings::default()
        };

        let config = settings.into_config(&Args::default());

        assert_eq!(config.install_dir, Path::new("/from/settings"));
    }

    #[test]
    fn explicit_missing_file_is_read_error() {
        let temp = tempfile::tempdir().expect("tempdir should be created");

        let result = Settings::load(Some(&temp.path().join("missing.json")));

        assert!(matches!(result, Err(SettingsError::Read { .. })));
    }

    #[test]
    fn explicit_invalid_file_is_parse_error() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let path = temp.path().join("settings.json");
        std::fs::write(&path, "{ not json").expect("settings should be written");

        let result = Settings::load(Some(&path));

        assert!(matches!(result, Err(SettingsError::Parse { .. })));
    }

    #[test]
    fn explicit_file_round_trips_through_disk() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let path = temp.path().join("settings.json");
        std::fs::write(&path, r#"{"keep_archive": false, "debug_logging": true}"#)
            .expect("settings should be written");

        let settings = Settings::load(Some(&path)).expect("settings should load");

        assert!(!settings.keep_archive);
        assert!(settings.debug_logging);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let path = temp.path().join("settings.json");
        std::fs::write(&path, r#"{"download_stall_timeout_secs": 0}"#)
            .expect("settings should be written");

        let result = Settings::load(Some(&path));

        assert!(matches!(
            result,
            Err(SettingsError::ZeroTimeout {
                field: "download_stall_timeout_secs",
                ..
            })
        ));
    }
}
