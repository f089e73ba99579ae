//! Versioned on-disk cache of resolved icon paths.
//!
//! One bincode-encoded file in the shared temporary directory maps
//! app ids to their resolved path, or to an explicit "checked,
//! nothing found" entry. The file is shared between processes without
//! locking; last writer wins.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Bumped whenever the on-disk layout changes. A file with any other
/// version is discarded wholesale, never partially trusted.
const FORMAT_VERSION: u32 = 1;

const CACHE_FILE_NAME: &str = "steamlens-icon-cache.bin";

/// Errors from cache persistence.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encode error: {0}")]
    Encode(#[from] bincode::Error),
}

/// Resolved entries as persisted: `None` means "checked, no icon".
pub type Entries = HashMap<u32, Option<PathBuf>>;

#[derive(Serialize, Deserialize)]
struct CacheFile {
    version: u32,
    entries: Entries,
}

/// Handle to the persistent icon-cache file.
#[derive(Debug, Clone)]
pub struct IconCache {
    path: PathBuf,
}

impl IconCache {
    /// The process-shared cache file in the system temp directory.
    pub fn shared() -> Self {
        Self {
            path: std::env::temp_dir().join(CACHE_FILE_NAME),
        }
    }

    /// A cache file at an explicit location.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Loads the cached entries.
    ///
    /// Any failure (absent file, unreadable bytes, version mismatch)
    /// yields an empty map; a stale or corrupt cache only costs
    /// re-resolution, never an error.
    pub fn load(&self) -> Entries {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "no usable icon cache");
                return Entries::new();
            }
        };

        let file: CacheFile = match bincode::deserialize(&data) {
            Ok(file) => file,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "discarding undecodable icon cache");
                return Entries::new();
            }
        };

        if file.version != FORMAT_VERSION {
            debug!(
                found = file.version,
                expected = FORMAT_VERSION,
                "discarding icon cache with mismatched format version"
            );
            return Entries::new();
        }

        debug!(count = file.entries.len(), "icon cache loaded");
        file.entries
    }

    /// Writes the entries back to disk.
    ///
    /// Callers treat failures as best-effort: log and move on.
    pub fn save(&self, entries: &Entries) -> Result<(), CacheError> {
        let data = bincode::serialize(&CacheFile {
            version: FORMAT_VERSION,
            entries: entries.clone(),
        })?;
        fs::write(&self.path, data)?;
        Ok(())
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}
