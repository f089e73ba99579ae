//! Steam installation discovery and path layout.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::ClientError;

#[cfg(target_os = "windows")]
#[path = "install_windows.rs"]
mod platform;

#[cfg(not(target_os = "windows"))]
#[path = "install_other.rs"]
mod platform;

/// File that marks a directory as a real Steam installation.
pub use platform::STEAM_EXE;

/// A validated Steam installation root.
///
/// Immutable after construction; every path below the installation is
/// derived from [`Installation::root`].
#[derive(Debug, Clone)]
pub struct Installation {
    root: PathBuf,
}

impl Installation {
    /// Locates the Steam installation.
    ///
    /// An explicit path short-circuits all probing. Otherwise the
    /// platform sources are tried in order (registry keys on Windows,
    /// the conventional data directories elsewhere) and the well-known
    /// default path is the last resort. A missing probe source is a
    /// fallback trigger, not an error.
    pub fn locate(explicit: Option<PathBuf>) -> Result<Self, ClientError> {
        let root = match explicit {
            Some(path) => path,
            None => match platform::probe() {
                Some(path) => {
                    debug!(path = %path.display(), "Steam root found by platform probe");
                    path
                }
                None => platform::default_root(),
            },
        };
        Self::at(root)
    }

    /// Validates `root` as a Steam installation.
    pub fn at(root: PathBuf) -> Result<Self, ClientError> {
        if !root.is_dir() {
            return Err(ClientError::InstallationNotFound(root));
        }
        if !root.join(STEAM_EXE).is_file() {
            return Err(ClientError::ExecutableMissing(root));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `config/`, which holds `loginusers.vdf` among others.
    pub fn config_dir(&self) -> PathBuf {
        self.root.join("config")
    }

    pub fn loginusers_path(&self) -> PathBuf {
        self.config_dir().join("loginusers.vdf")
    }

    pub fn steamapps_dir(&self) -> PathBuf {
        self.root.join("steamapps")
    }

    /// The registered-libraries manifest.
    pub fn library_manifest_path(&self) -> PathBuf {
        self.steamapps_dir().join("libraryfolders.vdf")
    }

    pub fn userdata_dir(&self, account_id: &str) -> PathBuf {
        self.root.join("userdata").join(account_id)
    }

    pub fn shortcuts_path(&self, account_id: &str) -> PathBuf {
        self.userdata_dir(account_id)
            .join("config")
            .join("shortcuts.vdf")
    }

    /// The icon/artwork cache written by the Steam client.
    pub fn librarycache_dir(&self) -> PathBuf {
        self.root.join("appcache").join("librarycache")
    }

    /// Alternate cache root for installs that double-nest under a
    /// `steam/` subdirectory.
    pub fn nested_librarycache_dir(&self) -> PathBuf {
        self.root
            .join("steam")
            .join("appcache")
            .join("librarycache")
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn fake_install(dir: &Path) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(STEAM_EXE), b"").unwrap();
    }

    #[test]
    fn explicit_path_is_validated() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("Steam");
        fake_install(&root);

        let install = Installation::locate(Some(root.clone())).unwrap();
        assert_eq!(install.root(), root);
    }

    #[test]
    fn missing_root_is_installation_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let err = Installation::locate(Some(tmp.path().join("nope"))).unwrap_err();
        assert!(matches!(err, ClientError::InstallationNotFound(_)));
    }

    #[test]
    fn root_without_marker_is_executable_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let err = Installation::locate(Some(tmp.path().to_path_buf())).unwrap_err();
        assert!(matches!(err, ClientError::ExecutableMissing(_)));
    }

    #[test]
    fn path_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("Steam");
        fake_install(&root);
        let install = Installation::at(root.clone()).unwrap();

        assert_eq!(install.loginusers_path(), root.join("config/loginusers.vdf"));
        assert_eq!(
            install.library_manifest_path(),
            root.join("steamapps/libraryfolders.vdf")
        );
        assert_eq!(
            install.shortcuts_path("123"),
            root.join("userdata/123/config/shortcuts.vdf")
        );
        assert_eq!(
            install.librarycache_dir(),
            root.join("appcache/librarycache")
        );
        assert_eq!(
            install.nested_librarycache_dir(),
            root.join("steam/appcache/librarycache")
        );
    }
}
