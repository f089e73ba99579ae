use std::path::PathBuf;

use tracing::trace;
use winreg::RegKey;
use winreg::enums::HKEY_LOCAL_MACHINE;

use super::normalize_icon_value;

/// Uninstall trees, 64-bit view first.
const UNINSTALL_ROOTS: [&str; 2] = [
    r"SOFTWARE\Microsoft\Windows\CurrentVersion\Uninstall",
    r"SOFTWARE\WOW6432Node\Microsoft\Windows\CurrentVersion\Uninstall",
];

/// Icon-bearing value names, in priority order.
const ICON_VALUES: [&str; 2] = ["DisplayIcon", "QuietDisplayIcon"];

/// Conventional icon file names probed under `InstallLocation` when no
/// icon value resolves.
const INSTALL_DIR_ICONS: [&str; 3] = ["icon.ico", "game.ico", "app.ico"];

/// Looks the app's uninstall entry up and returns the first icon path
/// that exists on disk.
///
/// Missing keys, missing values and denied registry access are all
/// ordinary misses.
pub(crate) fn icon_from_registry(app_id: u32) -> Option<PathBuf> {
    for root in UNINSTALL_ROOTS {
        let subkey = format!(r"{root}\Steam App {app_id}");
        let Ok(key) = RegKey::predef(HKEY_LOCAL_MACHINE).open_subkey(&subkey) else {
            continue;
        };

        for value_name in ICON_VALUES {
            let Ok(raw) = key.get_value::<String, _>(value_name) else {
                continue;
            };
            let candidate = PathBuf::from(normalize_icon_value(&raw));
            if candidate.is_file() {
                trace!(app_id, value_name, path = %candidate.display(), "registry icon value hit");
                return Some(candidate);
            }
        }

        if let Ok(raw) = key.get_value::<String, _>("InstallLocation") {
            let install_dir = PathBuf::from(normalize_icon_value(&raw));
            for name in INSTALL_DIR_ICONS {
                let candidate = install_dir.join(name);
                if candidate.is_file() {
                    trace!(app_id, path = %candidate.display(), "install-location icon hit");
                    return Some(candidate);
                }
            }
        }
    }

    None
}
