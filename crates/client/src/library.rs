//! Steam libraries and their installed games.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::vdf::{Document, Value};
use crate::{ClientError, Installation};

/// A registered library folder containing installed games.
#[derive(Debug, Clone, PartialEq)]
pub struct Library {
    folder: PathBuf,
}

/// One installed game, parsed from its app manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct Game {
    pub app_id: u32,
    pub name: String,
    pub install_dir: PathBuf,
}

impl Installation {
    /// Returns all registered libraries from `libraryfolders.vdf`.
    ///
    /// A missing manifest is fatal for game enumeration
    /// ([`ClientError::LibraryManifestNotFound`]); user enumeration is
    /// unaffected.
    pub fn libraries(&self) -> Result<Vec<Library>, ClientError> {
        let manifest_path = self.library_manifest_path();
        let doc = match Document::load(&manifest_path) {
            Ok(doc) => doc,
            Err(ClientError::NotFound(path)) => {
                return Err(ClientError::LibraryManifestNotFound(path));
            }
            Err(e) => return Err(e),
        };

        // The top-level key changed casing across client versions.
        let folders = doc
            .get("libraryfolders")
            .or_else(|| doc.get("LibraryFolders"))
            .and_then(Value::as_table)
            .ok_or_else(|| {
                ClientError::Parse(format!(
                    "no libraryfolders key in {}",
                    manifest_path.display()
                ))
            })?;

        let mut libraries = Vec::new();
        for (key, value) in folders.iter() {
            // Numeric keys are library entries; anything else is
            // metadata like `contentstatsid`.
            if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
                continue;
            }
            // Newer manifests nest the path in a table; older ones
            // store it as a bare string.
            let path = match value {
                Value::Table(entry) => entry.get_str("path"),
                Value::Str(path) => Some(path.as_str()),
            };
            match path {
                Some(path) => libraries.push(Library::new(path)),
                None => warn!(key, "library entry without a path, skipped"),
            }
        }

        debug!(count = libraries.len(), "libraries registered in manifest");
        Ok(libraries)
    }
}

impl Library {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Lazily enumerates installed games by scanning
    /// `steamapps/appmanifest_*.acf`.
    ///
    /// Restartable: each call re-scans the directory. Order is
    /// whatever the filesystem yields. Unreadable or malformed
    /// manifests are logged and skipped.
    pub fn games(&self) -> impl Iterator<Item = Game> {
        let steamapps = self.folder.join("steamapps");
        let common = steamapps.join("common");

        fs::read_dir(&steamapps)
            .map_err(|e| debug!(dir = %steamapps.display(), error = %e, "cannot read steamapps"))
            .into_iter()
            .flatten()
            .flatten()
            .filter_map(move |entry| {
                let file_name = entry.file_name();
                if !is_manifest_filename(&file_name.to_string_lossy()) {
                    return None;
                }
                parse_app_manifest(&entry.path(), &common)
            })
    }
}

/// Matches `appmanifest_<digits>.acf`.
fn is_manifest_filename(name: &str) -> bool {
    name.strip_prefix("appmanifest_")
        .and_then(|rest| rest.strip_suffix(".acf"))
        .is_some_and(|id| !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()))
}

fn parse_app_manifest(path: &Path, common: &Path) -> Option<Game> {
    let doc = Document::load(path)
        .map_err(|e| warn!(path = %path.display(), error = %e, "skipping unreadable app manifest"))
        .ok()?;

    let state = doc.get_table("AppState")?;
    let app_id = state.get_str("appid")?.parse::<u32>().ok()?;
    let name = state.get_str("name")?.to_owned();
    let install_dir = common.join(state.get_str("installdir")?);

    Some(Game {
        app_id,
        name,
        install_dir,
    })
}
