//! Launcher-facing catalog: the business logic between the on-disk
//! Steam model and a query/launch host.
//!
//! This crate aggregates installed games and the most recent user's
//! shortcuts into icon-enriched [`CatalogEntry`] records, shapes them
//! into the `{title, subtitle, icon, action}` items a launcher
//! displays, and builds the `steam://` URIs its actions dispatch. It
//! is a library crate with no UI dependencies; query scoring and
//! settings storage belong to the host.

pub mod catalog;
pub mod launch;
pub mod types;

// Re-export primary types for convenience.
pub use catalog::Catalog;
pub use launch::LaunchAction;
pub use types::{CatalogEntry, EntryKind, QueryItem};
