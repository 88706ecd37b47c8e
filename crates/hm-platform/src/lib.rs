//! Host-platform adapters for the updater.
//!
//! - Per-user application directories (settings and log file locations).
//! - The installed-tool resolver, which asks the host's package registration
//!   (the Windows uninstall registry) where an application was installed.

mod paths;
mod registry;

pub use paths::{AppPaths, AppPathsError};
pub use registry::{InstalledToolResolver, NoRegistry, host_resolver};

#[cfg(windows)]
pub use registry::WindowsRegistry;
