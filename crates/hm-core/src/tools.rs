use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use hm_platform::InstalledToolResolver;
use log::debug;

/// Archivers the updater knows how to drive, in preference order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveTool {
    WinRar,
    SevenZip,
}

impl ArchiveTool {
    pub const PREFERENCE: [ArchiveTool; 2] = [ArchiveTool::WinRar, ArchiveTool::SevenZip];

    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            ArchiveTool::WinRar => "WinRAR",
            ArchiveTool::SevenZip => "7-Zip",
        }
    }

    /// Uninstall-registry key the tool's installer writes.
    #[must_use]
    pub fn registration_key(self) -> &'static str {
        match self {
            ArchiveTool::WinRar => "WinRAR archiver",
            ArchiveTool::SevenZip => "7-Zip",
        }
    }

    #[must_use]
    pub fn executable_names(self) -> &'static [&'static str] {
        #[cfg(windows)]
        {
            match self {
                ArchiveTool::WinRar => &["WinRAR.exe"],
                ArchiveTool::SevenZip => &["7z.exe"],
            }
        }

        // Console RAR builds off Windows may not read .7z; such an attempt
        // fails and extraction moves on to 7-Zip.
        #[cfg(not(windows))]
        {
            match self {
                ArchiveTool::WinRar => &["rar"],
                ArchiveTool::SevenZip => &["7z", "7zz", "7za"],
            }
        }
    }

    /// Directory below a conventional install root that holds the executable.
    #[must_use]
    pub fn conventional_dir(self, root: &Path) -> PathBuf {
        #[cfg(windows)]
        {
            match self {
                ArchiveTool::WinRar => root.join("WinRAR"),
                ArchiveTool::SevenZip => root.join("7-Zip"),
            }
        }

        #[cfg(not(windows))]
        {
            let _ = self;
            root.to_path_buf()
        }
    }

    /// Arguments that extract `archive` into the working directory, keeping
    /// folder structure and overwriting without prompting.
    #[must_use]
    pub fn extract_args(self, archive: &Path) -> Vec<OsString> {
        vec!["x".into(), "-y".into(), archive.as_os_str().to_os_string()]
    }
}

impl fmt::Display for ArchiveTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Finds an installed archiver.
///
/// Probe order, first existing file wins:
/// 1. the host package registration (`InstallLocation` + executable name),
/// 2. the conventional install roots,
/// 3. every directory on the search path.
pub struct ToolLocator {
    resolver: Box<dyn InstalledToolResolver>,
    conventional_roots: Vec<PathBuf>,
    search_path: Option<OsString>,
    cwd: PathBuf,
}

impl ToolLocator {
    #[must_use]
    pub fn new(
        resolver: Box<dyn InstalledToolResolver>,
        conventional_roots: Vec<PathBuf>,
        search_path: Option<OsString>,
    ) -> Self {
        Self {
            resolver,
            conventional_roots,
            search_path,
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Locator wired to this host's registry, install roots and `PATH`.
    #[must_use]
    pub fn for_host() -> Self {
        Self::new(
            hm_platform::host_resolver(),
            host_conventional_roots(),
            std::env::var_os("PATH"),
        )
    }

    #[must_use]
    pub fn locate(&self, tool: ArchiveTool) -> Option<PathBuf> {
        let names = tool.executable_names();

        if let Some(location) = self.resolver.install_location(tool.registration_key()) {
            debug!("{tool} registered at {}", location.display());
            if let Some(found) = first_file(&location, names) {
                return Some(found);
            }
        }

        for root in &self.conventional_roots {
            if let Some(found) = first_file(&tool.conventional_dir(root), names) {
                return Some(found);
            }
        }

        let search_path = self.search_path.as_ref()?;
        names
            .iter()
            .find_map(|name| which::which_in(name, Some(search_path), &self.cwd).ok())
            .inspect(|found| debug!("{tool} found on PATH: {}", found.display()))
    }
}

fn first_file(dir: &Path, names: &[&str]) -> Option<PathBuf> {
    names
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
        .inspect(|found| debug!("Found archiver at {}", found.display()))
}

fn host_conventional_roots() -> Vec<PathBuf> {
    #[cfg(windows)]
    {
        ["ProgramFiles", "ProgramFiles(x86)"]
            .into_iter()
            .filter_map(std::env::var_os)
            .map(PathBuf::from)
            .collect()
    }

    #[cfg(not(windows))]
    {
        ["/usr/bin", "/usr/local/bin", "/opt/homebrew/bin"]
            .into_iter()
            .map(PathBuf::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use hm_platform::{InstalledToolResolver, NoRegistry};

    use super::{ArchiveTool, ToolLocator};
    use crate::test_support::place_script;

    fn place_executable(dir: &Path, name: &str) -> PathBuf {
        place_script(dir, name, "exit 0")
    }

    struct FixedRegistry(PathBuf);

    impl InstalledToolResolver for FixedRegistry {
        fn install_location(&self, registration_key: &str) -> Option<PathBuf> {
            (registration_key == ArchiveTool::WinRar.registration_key()).then(|| self.0.clone())
        }
    }

    #[test]
    fn registry_location_wins_over_search_path() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let name = ArchiveTool::WinRar.executable_names()[0];
        let registered = place_executable(&temp.path().join("registered"), name);
        let path_dir = temp.path().join("bin");
        place_executable(&path_dir, name);

        let locator = ToolLocator::new(
            Box::new(FixedRegistry(temp.path().join("registered"))),
            Vec::new(),
            Some(path_dir.into_os_string()),
        );

        assert_eq!(locator.locate(ArchiveTool::WinRar), Some(registered));
    }

    #[test]
    fn conventional_root_wins_over_search_path() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let tool = ArchiveTool::SevenZip;
        let name = tool.executable_names()[0];
        let root = temp.path().join("programs");
        let conventional = place_executable(&tool.conventional_dir(&root), name);
        let path_dir = temp.path().join("bin");
        place_executable(&path_dir, name);

        let locator = ToolLocator::new(
            Box::new(NoRegistry),
            vec![root],
            Some(path_dir.into_os_string()),
        );

        assert_eq!(locator.locate(tool), Some(conventional));
    }

    #[test]
    fn stale_registry_entry_falls_through_to_search_path() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let name = ArchiveTool::WinRar.executable_names()[0];
        let path_dir = temp.path().join("bin");
        let on_path = place_executable(&path_dir, name);

        let locator = ToolLocator::new(
            Box::new(FixedRegistry(temp.path().join("uninstalled"))),
            Vec::new(),
            Some(path_dir.into_os_string()),
        );

        let found = locator
            .locate(ArchiveTool::WinRar)
            .expect("tool on PATH should be found");
        assert_eq!(
            found.canonicalize().expect("found path should exist"),
            on_path.canonicalize().expect("placed path should exist")
        );
    }

    #[test]
    fn search_path_entries_are_all_checked() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let name = ArchiveTool::SevenZip.executable_names()[0];
        let empty_dir = temp.path().join("empty");
        std::fs::create_dir_all(&empty_dir).expect("empty dir should be created");
        let second_dir = temp.path().join("second");
        let on_path = place_executable(&second_dir, name);
        let search_path =
            std::env::join_paths([empty_dir, second_dir]).expect("paths should join");

        let locator = ToolLocator::new(Box::new(NoRegistry), Vec::new(), Some(search_path));

        let found = locator
            .locate(ArchiveTool::SevenZip)
            .expect("tool on second PATH entry should be found");
        assert_eq!(
            found.canonicalize().expect("found path should exist"),
            on_path.canonicalize().expect("placed path should exist")
        );
    }

    #[test]
    fn nothing_installed_returns_none() {
        let temp = tempfile::tempdir().expect("tempdir should be created");

        let locator = ToolLocator::new(
            Box::new(NoRegistry),
            vec![temp.path().to_path_buf()],
            Some(temp.path().as_os_str().to_os_string()),
        );

        assert!(locator.locate(ArchiveTool::WinRar).is_none());
        assert!(locator.locate(ArchiveTool::SevenZip).is_none());
    }

    #[test]
    fn extract_args_end_with_archive() {
        let args = ArchiveTool::SevenZip.extract_args(Path::new("HeatedMetal.7z"));

        assert_eq!(args, vec!["x", "-y", "HeatedMetal.7z"]);
    }

    #[test]
    fn display_uses_product_names() {
        assert_eq!(ArchiveTool::WinRar.to_string(), "WinRAR");
        assert_eq!(ArchiveTool::SevenZip.to_string(), "7-Zip");
    }
}
