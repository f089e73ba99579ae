//! The tiered icon resolver.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use sha2::{Digest, Sha256};
use tokio::sync::OnceCell;
use tracing::{debug, trace, warn};

use steamlens_client::Installation;

use crate::cache::{Entries, IconCache};
use crate::registry;

/// Per-request timeout for CDN attempts.
const REMOTE_TIMEOUT: Duration = Duration::from_secs(5);

/// Subdirectory of the system temp dir that holds downloaded icons.
const DOWNLOAD_DIR_NAME: &str = "steamlens-icons";

/// Flat librarycache file names, probed as `<id>_<name>` under both
/// cache roots, in priority order.
const FLAT_CACHE_NAMES: [&str; 2] = ["icon.jpg", "library_600x900.jpg"];

/// File names probed inside the newer per-app `librarycache/<id>/`
/// subdirectory.
const PER_APP_CACHE_NAMES: [&str; 2] = ["icon.jpg", "library_600x900.jpg"];

/// CDN fallbacks, tried in order. `{app_id}` is replaced by the id.
const DEFAULT_ENDPOINTS: [&str; 3] = [
    "https://cdn.cloudflare.steamstatic.com/steam/apps/{app_id}/library_600x900.jpg",
    "https://media.steampowered.com/steamcommunity/public/images/apps/{app_id}/{app_id}.jpg",
    "https://cdn.akamai.steamstatic.com/steam/apps/{app_id}/library_600x900.jpg",
];

/// Resolves display icons for app ids through a fixed tier chain:
/// memory, uninstall registry, local librarycache files, Steam CDN.
///
/// The first tier to produce an existing file wins; the outcome
/// (successful or not) is memoized in memory and flushed to the
/// persistent cache on [`IconResolver::persist`] and on drop. A
/// single in-flight resolution exists per id; concurrent callers for
/// the same id share its result.
pub struct IconResolver {
    installation: Installation,
    cache: IconCache,
    client: reqwest::Client,
    download_dir: PathBuf,
    endpoints: Vec<String>,
    resolved: Mutex<Entries>,
    inflight: tokio::sync::Mutex<HashMap<u32, Arc<OnceCell<Option<PathBuf>>>>>,
}

impl IconResolver {
    /// Resolver backed by the process-shared cache file.
    pub fn new(installation: Installation) -> Self {
        Self::with_cache(installation, IconCache::shared())
    }

    /// Resolver backed by an explicit cache file.
    pub fn with_cache(installation: Installation, cache: IconCache) -> Self {
        let resolved = cache.load();
        Self {
            installation,
            cache,
            client: reqwest::Client::new(),
            download_dir: std::env::temp_dir().join(DOWNLOAD_DIR_NAME),
            endpoints: DEFAULT_ENDPOINTS.iter().map(|s| s.to_string()).collect(),
            resolved: Mutex::new(resolved),
            inflight: tokio::sync::Mutex::new(HashMap::new()),
        }
    }

    /// Replaces the CDN endpoint list (templates containing
    /// `{app_id}`).
    pub fn with_endpoints(mut self, endpoints: Vec<String>) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Replaces the directory downloaded icons are written to.
    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = dir.into();
        self
    }

    /// Resolves the icon for one app id.
    ///
    /// A memoized answer, including a memoized "no icon", returns
    /// without touching any tier. Otherwise the tier chain runs once,
    /// shared with any concurrent caller asking for the same id.
    pub async fn resolve(&self, app_id: u32) -> Option<PathBuf> {
        {
            let resolved = self.resolved_guard();
            if let Some(cached) = resolved.get(&app_id) {
                trace!(app_id, "icon memory hit");
                return cached.clone();
            }
        }

        let cell = {
            let mut inflight = self.inflight.lock().await;
            inflight
                .entry(app_id)
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        let result = cell.get_or_init(|| self.run_tiers(app_id)).await.clone();

        self.resolved_guard().insert(app_id, result.clone());
        self.inflight.lock().await.remove(&app_id);

        result
    }

    /// Flushes the memoized entries to the persistent cache.
    pub fn persist(&self) -> Result<(), crate::CacheError> {
        let snapshot = self.resolved_guard().clone();
        self.cache.save(&snapshot)
    }

    /// Runs the fallible tiers in order. `None` is a normal outcome;
    /// an absent data source in any tier is a miss, never an error.
    async fn run_tiers(&self, app_id: u32) -> Option<PathBuf> {
        if let Some(path) = registry::icon_from_registry(app_id) {
            debug!(app_id, path = %path.display(), "icon resolved from registry");
            return Some(path);
        }
        if let Some(path) = self.icon_from_local_cache(app_id) {
            debug!(app_id, path = %path.display(), "icon resolved from librarycache");
            return Some(path);
        }
        match self.icon_from_cdn(app_id).await {
            Some(path) => {
                debug!(app_id, path = %path.display(), "icon downloaded from CDN");
                Some(path)
            }
            None => {
                debug!(app_id, "no icon in any tier");
                None
            }
        }
    }

    /// Local-files tier: first existing probe path wins.
    fn icon_from_local_cache(&self, app_id: u32) -> Option<PathBuf> {
        self.local_candidates(app_id)
            .into_iter()
            .find(|path| path.is_file())
    }

    /// Ordered probe list under the installation root and its
    /// double-nested `steam/` alternate.
    fn local_candidates(&self, app_id: u32) -> Vec<PathBuf> {
        let roots = [
            self.installation.librarycache_dir(),
            self.installation.nested_librarycache_dir(),
        ];

        let mut candidates = Vec::new();
        for name in FLAT_CACHE_NAMES {
            for root in &roots {
                candidates.push(root.join(format!("{app_id}_{name}")));
            }
        }
        // Newer clients nest per-app directories instead.
        for name in PER_APP_CACHE_NAMES {
            for root in &roots {
                candidates.push(root.join(app_id.to_string()).join(name));
            }
        }
        candidates
    }

    /// Remote tier: first HTTP 200 body is written to the download
    /// directory and its path returned. Failures and timeouts step to
    /// the next endpoint.
    async fn icon_from_cdn(&self, app_id: u32) -> Option<PathBuf> {
        for template in &self.endpoints {
            let url = template.replace("{app_id}", &app_id.to_string());

            let response = match self
                .client
                .get(&url)
                .timeout(REMOTE_TIMEOUT)
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    trace!(app_id, url, error = %e, "CDN request failed");
                    continue;
                }
            };

            if response.status() != reqwest::StatusCode::OK {
                trace!(app_id, url, status = %response.status(), "CDN miss");
                continue;
            }

            let body = match response.bytes().await {
                Ok(body) => body,
                Err(e) => {
                    trace!(app_id, url, error = %e, "CDN body read failed");
                    continue;
                }
            };

            match self.store_download(app_id, &url, &body) {
                Ok(path) => return Some(path),
                Err(e) => {
                    warn!(app_id, url, error = %e, "could not store downloaded icon");
                    continue;
                }
            }
        }
        None
    }

    /// Writes a downloaded body to a deterministic per-URL file name.
    fn store_download(
        &self,
        app_id: u32,
        url: &str,
        body: &[u8],
    ) -> Result<PathBuf, std::io::Error> {
        std::fs::create_dir_all(&self.download_dir)?;
        let ext = url.rsplit('.').next().filter(|e| e.len() <= 4).unwrap_or("jpg");
        let path = self
            .download_dir
            .join(format!("{app_id}_{}.{ext}", hash_url(url)));
        std::fs::write(&path, body)?;
        Ok(path)
    }

    /// Locks the memoized map, recovering from a poisoned lock; the
    /// map is always left in a consistent state by its writers.
    fn resolved_guard(&self) -> MutexGuard<'_, Entries> {
        match self.resolved.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Drop for IconResolver {
    fn drop(&mut self) {
        // Best-effort flush on every shutdown path.
        if let Err(e) = self.persist() {
            warn!(error = %e, "icon cache save failed");
        }
    }
}

/// Deterministic file-name hash for a source URL: first 16 bytes of
/// SHA-256, hex-encoded.
fn hash_url(url: &str) -> String {
    let hash = Sha256::digest(url.as_bytes());
    hex::encode(&hash[..16])
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::*;

    /// Fixture installation with an empty librarycache, a resolver
    /// with no CDN endpoints, and a private cache file.
    fn fixture() -> (tempfile::TempDir, Arc<IconResolver>) {
        let tmp = tempfile::tempdir().unwrap();
        let resolver = fixture_in(tmp.path());
        (tmp, resolver)
    }

    fn fixture_in(dir: &Path) -> Arc<IconResolver> {
        let root = dir.join("Steam");
        fs::create_dir_all(root.join("appcache/librarycache")).unwrap();
        fs::write(root.join(steamlens_client::install::STEAM_EXE), b"").unwrap();

        let installation = Installation::at(root).unwrap();
        let cache = IconCache::at(dir.join("icon-cache.bin"));
        Arc::new(
            IconResolver::with_cache(installation, cache)
                .with_endpoints(Vec::new())
                .with_download_dir(dir.join("downloads")),
        )
    }

    fn write_flat_icon(resolver: &IconResolver, app_id: u32, name: &str) -> PathBuf {
        let path = resolver
            .installation
            .librarycache_dir()
            .join(format!("{app_id}_{name}"));
        fs::write(&path, b"jpg").unwrap();
        path
    }

    #[tokio::test]
    async fn local_tier_finds_flat_icon() {
        let (_tmp, resolver) = fixture();
        let expected = write_flat_icon(&resolver, 440, "icon.jpg");

        assert_eq!(resolver.resolve(440).await, Some(expected));
    }

    #[tokio::test]
    async fn icon_jpg_outranks_library_art() {
        let (_tmp, resolver) = fixture();
        write_flat_icon(&resolver, 440, "library_600x900.jpg");
        let expected = write_flat_icon(&resolver, 440, "icon.jpg");

        assert_eq!(resolver.resolve(440).await, Some(expected));
    }

    #[tokio::test]
    async fn nested_alternate_root_is_probed() {
        let (_tmp, resolver) = fixture();
        let nested = resolver.installation.nested_librarycache_dir();
        fs::create_dir_all(&nested).unwrap();
        let expected = nested.join("620_icon.jpg");
        fs::write(&expected, b"jpg").unwrap();

        assert_eq!(resolver.resolve(620).await, Some(expected));
    }

    #[tokio::test]
    async fn per_app_subdirectory_is_probed() {
        let (_tmp, resolver) = fixture();
        let dir = resolver.installation.librarycache_dir().join("730");
        fs::create_dir_all(&dir).unwrap();
        let expected = dir.join("library_600x900.jpg");
        fs::write(&expected, b"jpg").unwrap();

        assert_eq!(resolver.resolve(730).await, Some(expected));
    }

    #[tokio::test]
    async fn successful_result_is_memoized() {
        let (_tmp, resolver) = fixture();
        let path = write_flat_icon(&resolver, 440, "icon.jpg");

        let first = resolver.resolve(440).await;
        assert_eq!(first, Some(path.clone()));

        // Deleting the file proves the second answer comes from
        // memory, not from re-running the local tier.
        fs::remove_file(&path).unwrap();
        assert_eq!(resolver.resolve(440).await, Some(path));
    }

    #[tokio::test]
    async fn negative_result_is_memoized() {
        let (_tmp, resolver) = fixture();

        assert_eq!(resolver.resolve(999).await, None);

        // An icon appearing later must not be picked up within the
        // same cache lifetime.
        write_flat_icon(&resolver, 999, "icon.jpg");
        assert_eq!(resolver.resolve(999).await, None);
    }

    #[tokio::test]
    async fn zero_id_resolves_to_none() {
        let (_tmp, resolver) = fixture();
        assert_eq!(resolver.resolve(0).await, None);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_resolution() {
        let (_tmp, resolver) = fixture();
        let expected = write_flat_icon(&resolver, 440, "icon.jpg");

        let (a, b) = tokio::join!(resolver.resolve(440), resolver.resolve(440));
        assert_eq!(a, Some(expected.clone()));
        assert_eq!(b, Some(expected));
    }

    #[tokio::test]
    async fn persist_and_reload_skips_tiers() {
        let tmp = tempfile::tempdir().unwrap();

        let expected = {
            let resolver = fixture_in(tmp.path());
            let path = write_flat_icon(&resolver, 440, "icon.jpg");
            assert_eq!(resolver.resolve(440).await, Some(path.clone()));
            assert_eq!(resolver.resolve(999).await, None);
            resolver.persist().unwrap();
            path
        };

        // Fresh resolver over the same cache file; the icon file is
        // gone, so only the persisted cache can answer.
        fs::remove_file(&expected).unwrap();
        let resolver = fixture_in(tmp.path());
        assert_eq!(resolver.resolve(440).await, Some(expected));
        assert_eq!(resolver.resolve(999).await, None);
    }

    #[tokio::test]
    async fn drop_flushes_cache() {
        let tmp = tempfile::tempdir().unwrap();

        {
            let resolver = fixture_in(tmp.path());
            write_flat_icon(&resolver, 440, "icon.jpg");
            resolver.resolve(440).await;
        } // drop

        let cache = IconCache::at(tmp.path().join("icon-cache.bin"));
        assert!(cache.load().contains_key(&440));
    }

    #[tokio::test]
    async fn empty_endpoint_list_is_a_remote_miss() {
        let (_tmp, resolver) = fixture();
        assert_eq!(resolver.resolve(12345).await, None);
    }

    #[test]
    fn hash_url_is_stable_and_short() {
        let h = hash_url("https://example.com/a.jpg");
        assert_eq!(h, hash_url("https://example.com/a.jpg"));
        assert_eq!(h.len(), 32);
        assert_ne!(h, hash_url("https://example.com/b.jpg"));
    }

    #[test]
    fn local_candidate_order_is_flat_then_per_app() {
        let tmp = tempfile::tempdir().unwrap();
        let resolver = fixture_in(tmp.path());
        let candidates = resolver.local_candidates(440);

        let lc = resolver.installation.librarycache_dir();
        let nested = resolver.installation.nested_librarycache_dir();
        assert_eq!(candidates[0], lc.join("440_icon.jpg"));
        assert_eq!(candidates[1], nested.join("440_icon.jpg"));
        assert_eq!(candidates[2], lc.join("440_library_600x900.jpg"));
        assert_eq!(candidates[4], lc.join("440").join("icon.jpg"));
    }
}
