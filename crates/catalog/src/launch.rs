//! `steam://` URI actions.

use tracing::warn;

/// Actions the Steam client accepts for an app id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchAction {
    /// Start the game.
    Run,
    /// Open the game's store page.
    Store,
    /// Open the game's news page in the client.
    News,
    /// Start the uninstall flow.
    Uninstall,
}

impl LaunchAction {
    /// Builds the URI the Steam client handles.
    pub fn uri(&self, app_id: u32) -> String {
        let verb = match self {
            LaunchAction::Run => "rungameid",
            LaunchAction::Store => "store",
            LaunchAction::News => "appnews",
            LaunchAction::Uninstall => "uninstall",
        };
        format!("steam://{verb}/{app_id}")
    }

    /// Hands the URI to the OS handler.
    ///
    /// Dispatch failures are logged and dropped; the host has no
    /// recovery beyond what the user already sees.
    pub fn dispatch(&self, app_id: u32) {
        let uri = self.uri(app_id);
        if let Err(e) = open::that(&uri) {
            warn!(uri, error = %e, "failed to dispatch steam URI");
        }
    }
}
