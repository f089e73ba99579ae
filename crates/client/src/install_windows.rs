use std::path::PathBuf;

use winreg::RegKey;
use winreg::enums::{HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE};

pub const STEAM_EXE: &str = "steam.exe";

/// Returns the Steam root from the registry, trying each source in
/// order. Missing keys fall through to the next source.
pub(crate) fn probe() -> Option<PathBuf> {
    // 64-bit machine keys first, then the per-user keys written by
    // older clients. HKLM stores `InstallPath`, HKCU `SteamPath`.
    let sources: [(winreg::HKEY, &str, &str); 4] = [
        (HKEY_LOCAL_MACHINE, r"SOFTWARE\WOW6432Node\Valve\Steam", "InstallPath"),
        (HKEY_LOCAL_MACHINE, r"SOFTWARE\Valve\Steam", "InstallPath"),
        (HKEY_CURRENT_USER, r"SOFTWARE\WOW6432Node\Valve\Steam", "SteamPath"),
        (HKEY_CURRENT_USER, r"SOFTWARE\Valve\Steam", "SteamPath"),
    ];

    sources
        .iter()
        .find_map(|&(hive, subkey, value)| read_registry(hive, subkey, value))
}

pub(crate) fn default_root() -> PathBuf {
    PathBuf::from(r"C:\Program Files (x86)\Steam")
}

fn read_registry(hive: winreg::HKEY, subkey: &str, value: &str) -> Option<PathBuf> {
    let key = RegKey::predef(hive).open_subkey(subkey).ok()?;
    let path: String = key.get_value(value).ok()?;
    Some(PathBuf::from(path))
}
