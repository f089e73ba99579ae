//! Concurrent batch resolution.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use futures_util::FutureExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::warn;

use crate::IconResolver;

/// Fixed size of the resolution worker pool.
const WORKERS: usize = 4;

impl IconResolver {
    /// Resolves a batch of app ids in parallel and returns the
    /// completed id → path mapping.
    ///
    /// The input is a set, so each id is resolved at most once no
    /// matter how many games or shortcuts share it. One task per id
    /// runs on a pool bounded to [`WORKERS`] concurrent resolutions;
    /// the call returns once every task has finished. A task that
    /// panics is logged and recorded as `None`; it never aborts its
    /// siblings.
    pub async fn resolve_all(
        self: &Arc<Self>,
        ids: HashSet<u32>,
    ) -> HashMap<u32, Option<PathBuf>> {
        // Every requested id gets an answer, whatever its task's fate.
        let mut results: HashMap<u32, Option<PathBuf>> =
            ids.iter().map(|&id| (id, None)).collect();

        let semaphore = Arc::new(Semaphore::new(WORKERS));
        let mut tasks = JoinSet::new();

        for app_id in ids {
            let resolver = Arc::clone(self);
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                // The semaphore is never closed; acquire only fails
                // after that, so a miss here means the pool is gone.
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return (app_id, None);
                };
                let icon = std::panic::AssertUnwindSafe(resolver.resolve(app_id))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|_| {
                        warn!(app_id, "icon resolution panicked");
                        None
                    });
                (app_id, icon)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((app_id, icon)) => {
                    results.insert(app_id, icon);
                }
                Err(e) => warn!(error = %e, "icon resolution task lost"),
            }
        }

        results
    }
}
