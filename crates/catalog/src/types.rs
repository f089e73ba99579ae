//! Records exchanged with the launcher host.

use serde::{Deserialize, Serialize};

use crate::launch::LaunchAction;

/// Where a catalog entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntryKind {
    Game,
    Shortcut,
}

/// One installed game or non-Steam shortcut, enriched with its
/// resolved icon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub app_id: u32,
    pub name: String,
    /// Install directory for games, executable for shortcuts.
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub kind: EntryKind,
}

/// A display record for the host's result list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryItem {
    pub title: String,
    pub subtitle: String,
    pub icon: String,
    /// `steam://` URI the host dispatches on activation.
    pub action: String,
}

impl CatalogEntry {
    /// Shapes the entry for the host's result list. An entry without
    /// a resolved icon shows its path instead.
    pub fn to_query_item(&self) -> QueryItem {
        QueryItem {
            title: self.name.clone(),
            subtitle: self.path.clone(),
            icon: self.icon.clone().unwrap_or_else(|| self.path.clone()),
            action: LaunchAction::Run.uri(self.app_id),
        }
    }
}
