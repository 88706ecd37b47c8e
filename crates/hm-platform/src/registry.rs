use std::path::PathBuf;

/// Looks up where the host recorded an application as installed.
///
/// `registration_key` is the name the application registers itself under
/// (on Windows, the subkey below `...\CurrentVersion\Uninstall`).
pub trait InstalledToolResolver: Send + Sync {
    fn install_location(&self, registration_key: &str) -> Option<PathBuf>;
}

/// Resolver for hosts without a package registration mechanism.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRegistry;

impl InstalledToolResolver for NoRegistry {
    fn install_location(&self, _registration_key: &str) -> Option<PathBuf> {
        None
    }
}

/// Resolver that matches the host this binary was built for.
#[must_use]
pub fn host_resolver() -> Box<dyn InstalledToolResolver> {
    #[cfg(windows)]
    {
        Box::new(WindowsRegistry)
    }

    #[cfg(not(windows))]
    {
        Box::new(NoRegistry)
    }
}

#[cfg(windows)]
const UNINSTALL_ROOT: &str = "SOFTWARE\\Microsoft\\Windows\\CurrentVersion\\Uninstall";

/// Reads `InstallLocation` from the machine-wide uninstall registry.
#[cfg(windows)]
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsRegistry;

#[cfg(windows)]
impl InstalledToolResolver for WindowsRegistry {
    fn install_location(&self, registration_key: &str) -> Option<PathBuf> {
        use windows_sys::Win32::System::Registry::{RRF_SUBKEY_WOW6432KEY, RRF_SUBKEY_WOW6464KEY};

        // 64-bit view first, then the WOW6432Node view used by 32-bit installers.
        [RRF_SUBKEY_WOW6464KEY, RRF_SUBKEY_WOW6432KEY]
            .into_iter()
            .find_map(|view| query_install_location(registration_key, view))
    }
}

#[cfg(windows)]
fn query_install_location(registration_key: &str, view: u32) -> Option<PathBuf> {
    use windows_sys::Win32::Foundation::ERROR_SUCCESS;
    use windows_sys::Win32::System::Registry::{HKEY_LOCAL_MACHINE, RRF_RT_REG_SZ, RegGetValueW};

    let subkey: Vec<u16> = format!("{UNINSTALL_ROOT}\\{registration_key}")
        .encode_utf16()
        .chain(std::iter::once(0))
        .collect();
    let value_name: Vec<u16> = "InstallLocation\0".encode_utf16().collect();
    let flags = RRF_RT_REG_SZ | view;

    unsafe {
        let mut byte_len: u32 = 0;
        let status = RegGetValueW(
            HKEY_LOCAL_MACHINE,
            subkey.as_ptr(),
            value_name.as_ptr(),
            flags,
            std::ptr::null_mut(),
            std::ptr::null_mut(),
            &mut byte_len,
        );
        if status != ERROR_SUCCESS || byte_len == 0 {
            return None;
        }

        let mut buffer = vec![0_u16; (byte_len as usize).div_ceil(2)];
        let status = RegGetValueW(
            HKEY_LOCAL_MACHINE,
            subkey.as_ptr(),
            value_name.as_ptr(),
            flags,
            std::ptr::null_mut(),
            buffer.as_mut_ptr().cast(),
            &mut byte_len,
        );
        if status != ERROR_SUCCESS {
            log::debug!("RegGetValueW failed for {registration_key}: {status}");
            return None;
        }

        let len = buffer.iter().position(|&c| c == 0).unwrap_or(buffer.len());
        let location = String::from_utf16_lossy(&buffer[..len]);
        let location = location.trim();
        if location.is_empty() {
            None
        } else {
            Some(PathBuf::from(location))
        }
    }
}
