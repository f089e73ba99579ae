//! On-disk Steam client model.
//!
//! This crate locates a Steam installation and exposes what it
//! contains: registered libraries and their installed games, login
//! users, and per-user non-Steam shortcuts. It is a library crate
//! with no UI or network dependencies; icon resolution lives in
//! `steamlens-icons`, launcher-facing records in `steamlens-catalog`.
//!
//! # Usage
//!
//! ```no_run
//! use steamlens_client::Installation;
//!
//! let install = Installation::locate(None)?;
//! for library in install.libraries()? {
//!     for game in library.games() {
//!         println!("{} ({})", game.name, game.app_id);
//!     }
//! }
//! let users = install.login_users()?;
//! if let Some(user) = users.most_recent() {
//!     let shortcuts = user.shortcuts()?;
//! }
//! # Ok::<(), steamlens_client::ClientError>(())
//! ```

pub mod error;
pub mod install;
pub mod library;
pub mod shortcuts;
pub mod users;
pub mod vdf;

// Re-export primary types for convenience.
pub use error::ClientError;
pub use install::Installation;
pub use library::{Game, Library};
pub use shortcuts::Shortcut;
pub use users::{LoginUser, LoginUsers};
