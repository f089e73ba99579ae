use std::path::PathBuf;

/// No uninstall registry outside Windows; the tier always misses.
pub(crate) fn icon_from_registry(_app_id: u32) -> Option<PathBuf> {
    None
}
