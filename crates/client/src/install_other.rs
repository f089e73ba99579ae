use std::path::PathBuf;

pub const STEAM_EXE: &str = "steam.sh";

/// Returns the first conventional Steam data directory that exists.
pub(crate) fn probe() -> Option<PathBuf> {
    candidates().into_iter().find(|path| path.is_dir())
}

pub(crate) fn default_root() -> PathBuf {
    home()
        .map(|home| home.join(".local/share/Steam"))
        .unwrap_or_else(|| PathBuf::from("/usr/lib/steam"))
}

fn candidates() -> Vec<PathBuf> {
    let mut out = Vec::new();
    if let Ok(xdg_data) = std::env::var("XDG_DATA_HOME") {
        out.push(PathBuf::from(xdg_data).join("Steam"));
    }
    if let Some(home) = home() {
        out.push(home.join(".local/share/Steam"));
        out.push(home.join(".steam/steam"));
    }
    out
}

fn home() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}
