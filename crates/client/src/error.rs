//! Error types for Steam client discovery and parsing.

use std::path::PathBuf;

/// Errors produced while locating and reading a Steam installation.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// No usable installation directory. Remediation: point the plugin
    /// at the Steam directory explicitly.
    #[error("no Steam installation found at {0}")]
    InstallationNotFound(PathBuf),

    /// The directory exists but does not look like a Steam
    /// installation. Remediation: the configured path is wrong.
    #[error("{0} exists but does not contain the Steam executable")]
    ExecutableMissing(PathBuf),

    /// `libraryfolders.vdf` is missing. Fatal for game enumeration;
    /// user enumeration may still work.
    #[error("Steam library manifest not found at {0}")]
    LibraryManifestNotFound(PathBuf),

    /// A required store file is absent.
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed VDF document (text or binary).
    #[error("VDF parse error: {0}")]
    Parse(String),
}
