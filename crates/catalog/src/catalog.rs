//! Catalog assembly: games + shortcuts, icons prefetched.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use steamlens_client::{ClientError, Game, Installation, Shortcut};
use steamlens_icons::IconResolver;

use crate::launch::LaunchAction;
use crate::types::{CatalogEntry, EntryKind, QueryItem};

/// Aggregates everything the launcher shows for one Steam
/// installation.
pub struct Catalog {
    installation: Installation,
    resolver: Arc<IconResolver>,
}

impl Catalog {
    /// Catalog with a resolver backed by the process-shared icon
    /// cache.
    pub fn new(installation: Installation) -> Self {
        let resolver = Arc::new(IconResolver::new(installation.clone()));
        Self {
            installation,
            resolver,
        }
    }

    /// Catalog over an explicitly configured resolver.
    pub fn with_resolver(installation: Installation, resolver: Arc<IconResolver>) -> Self {
        Self {
            installation,
            resolver,
        }
    }

    pub fn installation(&self) -> &Installation {
        &self.installation
    }

    pub fn resolver(&self) -> &Arc<IconResolver> {
        &self.resolver
    }

    /// All installed games plus the most recent user's shortcuts,
    /// icons batch-prefetched.
    ///
    /// Library enumeration failures are fatal here; a user without a
    /// shortcuts store just contributes nothing.
    pub async fn entries(&self) -> Result<Vec<CatalogEntry>, ClientError> {
        let games = self.games()?;
        let shortcuts = self.shortcuts()?;

        let ids: HashSet<u32> = games
            .iter()
            .map(|game| game.app_id)
            .chain(shortcuts.iter().map(|shortcut| shortcut.app_id))
            .collect();
        let icons = self.resolver.resolve_all(ids).await;

        let mut entries = Vec::with_capacity(games.len() + shortcuts.len());
        for game in games {
            let icon = icons
                .get(&game.app_id)
                .cloned()
                .flatten()
                .map(|path| path.display().to_string());
            entries.push(CatalogEntry {
                app_id: game.app_id,
                name: game.name,
                path: game.install_dir.display().to_string(),
                icon,
                kind: EntryKind::Game,
            });
        }
        for shortcut in shortcuts {
            let resolved = icons.get(&shortcut.app_id).cloned().flatten();
            entries.push(shortcut_entry(&shortcut, resolved));
        }

        debug!(count = entries.len(), "catalog assembled");
        Ok(entries)
    }

    /// Display records for the host's result list.
    pub async fn query_items(&self) -> Result<Vec<QueryItem>, ClientError> {
        Ok(self
            .entries()
            .await?
            .iter()
            .map(CatalogEntry::to_query_item)
            .collect())
    }

    /// Looks one entry up by app id.
    pub async fn find_by_id(&self, app_id: u32) -> Result<Option<CatalogEntry>, ClientError> {
        self.find_where(|_, id| id == app_id).await
    }

    /// Looks one entry up by name, case-insensitively.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<CatalogEntry>, ClientError> {
        self.find_where(|entry_name, _| entry_name.eq_ignore_ascii_case(name))
            .await
    }

    /// The per-entry context menu the host shows on demand.
    pub fn context_menu(app_id: u32) -> Vec<QueryItem> {
        vec![
            QueryItem {
                title: "Show in Steam store".into(),
                subtitle: "Opens the game's store page".into(),
                icon: String::new(),
                action: LaunchAction::Store.uri(app_id),
            },
            QueryItem {
                title: "Show news".into(),
                subtitle: "Opens the game's news page in Steam".into(),
                icon: String::new(),
                action: LaunchAction::News.uri(app_id),
            },
            QueryItem {
                title: "Uninstall game".into(),
                subtitle: "Removes this game from the Steam library".into(),
                icon: String::new(),
                action: LaunchAction::Uninstall.uri(app_id),
            },
        ]
    }

    async fn find_where(
        &self,
        matches: impl Fn(&str, u32) -> bool,
    ) -> Result<Option<CatalogEntry>, ClientError> {
        for game in self.games()? {
            if matches(&game.name, game.app_id) {
                let icon = self
                    .resolver
                    .resolve(game.app_id)
                    .await
                    .map(|path| path.display().to_string());
                return Ok(Some(CatalogEntry {
                    app_id: game.app_id,
                    name: game.name,
                    path: game.install_dir.display().to_string(),
                    icon,
                    kind: EntryKind::Game,
                }));
            }
        }
        for shortcut in self.shortcuts()? {
            if matches(&shortcut.name, shortcut.app_id) {
                let resolved = self.resolver.resolve(shortcut.app_id).await;
                return Ok(Some(shortcut_entry(&shortcut, resolved)));
            }
        }
        Ok(None)
    }

    /// Installed games across all libraries, deduplicated by app id;
    /// the manifest does not guarantee uniqueness across folders.
    fn games(&self) -> Result<Vec<Game>, ClientError> {
        let mut seen = HashSet::new();
        let mut games = Vec::new();
        for library in self.installation.libraries()? {
            for game in library.games() {
                if seen.insert(game.app_id) {
                    games.push(game);
                }
            }
        }
        Ok(games)
    }

    /// The most recent user's shortcuts; an installation with no
    /// logged-in users has none.
    fn shortcuts(&self) -> Result<Vec<Shortcut>, ClientError> {
        let users = self.installation.login_users()?;
        match users.most_recent() {
            Some(user) => user.shortcuts(),
            None => Ok(Vec::new()),
        }
    }
}

/// Shortcut entries fall back to their user-assigned icon when the
/// resolver comes up empty.
fn shortcut_entry(shortcut: &Shortcut, resolved: Option<std::path::PathBuf>) -> CatalogEntry {
    let icon = resolved
        .map(|path| path.display().to_string())
        .or_else(|| (!shortcut.icon.is_empty()).then(|| shortcut.icon.clone()));
    CatalogEntry {
        app_id: shortcut.app_id,
        name: shortcut.name.clone(),
        path: shortcut.exe.clone(),
        icon,
        kind: EntryKind::Shortcut,
    }
}
