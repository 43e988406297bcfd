//! Catalog store - owns the loaded manifest for a browsing session / 目录存储
//!
//! Readers get `Arc` snapshots; a reload swaps the whole catalog, nothing is
//! patched in place.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use crate::error::BrowseError;
use crate::notify::Notifier;
use crate::search::tags;

use super::model::{Catalog, VariantThumbnails};
use super::source::CatalogSource;

/// Load summary / 加载摘要
#[derive(Debug, Clone, Serialize)]
pub struct LoadSummary {
    pub loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub total_locations: usize,
    pub total_flavors: usize,
    pub total_files: usize,
    pub variant_thumbnails: usize,
    pub loaded_at: Option<DateTime<Utc>>,
}

impl LoadSummary {
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }
}

pub struct CatalogStore {
    source: Arc<dyn CatalogSource>,
    catalog: RwLock<Arc<Catalog>>,
    variants: RwLock<Arc<VariantThumbnails>>,
    last_error: RwLock<Option<String>>,
    loaded_at: RwLock<Option<DateTime<Utc>>>,
    /// Set once a manifest has been held successfully / 是否已持有清单
    loaded: AtomicBool,
    /// One load in flight at a time / 同一时刻仅一个加载
    load_lock: tokio::sync::Mutex<()>,
}

impl CatalogStore {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self {
            source,
            catalog: RwLock::new(Arc::new(Catalog::empty())),
            variants: RwLock::new(Arc::new(VariantThumbnails::default())),
            last_error: RwLock::new(None),
            loaded_at: RwLock::new(None),
            loaded: AtomicBool::new(false),
            load_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Current catalog snapshot / 当前目录快照
    pub fn catalog(&self) -> Arc<Catalog> {
        self.catalog.read().clone()
    }

    pub fn variants(&self) -> Arc<VariantThumbnails> {
        self.variants.read().clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    pub fn source_description(&self) -> String {
        self.source.describe()
    }

    pub fn summary(&self) -> LoadSummary {
        let catalog = self.catalog();
        LoadSummary {
            loaded: self.is_loaded(),
            error: self.last_error.read().clone(),
            total_locations: catalog.total_locations,
            total_flavors: catalog.total_flavors,
            total_files: catalog.total_files,
            variant_thumbnails: self.variants.read().len(),
            loaded_at: *self.loaded_at.read(),
        }
    }

    /// Load only if no catalog is held yet / 未加载时才加载
    pub async fn ensure_loaded(&self, notifier: &dyn Notifier) -> LoadSummary {
        if self.is_loaded() {
            return self.summary();
        }
        self.load(notifier).await
    }

    /// Fetch manifest and variant mapping, replacing the held catalog / 加载清单
    ///
    /// Manifest failure leaves the store empty and is reported exactly once through
    /// `notifier`. Variant mapping failure is logged and otherwise ignored.
    pub async fn load(&self, notifier: &dyn Notifier) -> LoadSummary {
        let _guard = self.load_lock.lock().await;

        tracing::info!("Loading map catalog from {}", self.source.describe());
        let (manifest, variants) =
            tokio::join!(self.source.fetch_manifest(), self.source.fetch_variant_map());

        let variants = match variants {
            Ok(v) => {
                tracing::debug!("Variant thumbnail mapping loaded: {} entries", v.len());
                v
            }
            Err(e) => {
                tracing::warn!("Variant thumbnail mapping unavailable: {}", e);
                VariantThumbnails::default()
            }
        };

        match manifest {
            Ok(catalog) => {
                let catalog = prepare(catalog);
                tracing::info!(
                    "Map catalog loaded: {} locations, {} flavors, {} files",
                    catalog.total_locations,
                    catalog.total_flavors,
                    catalog.total_files
                );
                *self.catalog.write() = Arc::new(catalog);
                *self.variants.write() = Arc::new(variants);
                *self.last_error.write() = None;
                *self.loaded_at.write() = Some(Utc::now());
                self.loaded.store(true, Ordering::SeqCst);
            }
            Err(e) => {
                let e = match e {
                    BrowseError::Load(_) => e,
                    other => BrowseError::Load(other.to_string()),
                };
                let message = e.to_string();
                tracing::error!("{}", message);
                notifier.error(&message);
                *self.catalog.write() = Arc::new(Catalog::empty());
                *self.variants.write() = Arc::new(VariantThumbnails::default());
                *self.last_error.write() = Some(message);
                *self.loaded_at.write() = None;
                self.loaded.store(false, Ordering::SeqCst);
            }
        }

        self.summary()
    }
}

/// Freeze a freshly fetched manifest: drop duplicate ids, backfill tags, fill totals.
/// Manifest totals are kept only when no location was dropped.
fn prepare(mut catalog: Catalog) -> Catalog {
    let mut seen = HashSet::new();
    let before = catalog.locations.len();
    catalog.locations.retain(|location| {
        let fresh = seen.insert(location.id.clone());
        if !fresh {
            tracing::warn!("Duplicate location id in manifest, keeping first: {}", location.id);
        }
        fresh
    });

    let derived = tags::backfill(&mut catalog);
    if derived > 0 {
        tracing::debug!("Derived {} smart tag sets", derived);
    }

    let deduped = catalog.locations.len() != before;
    let missing = catalog.total_locations == 0 && catalog.total_flavors == 0 && catalog.total_files == 0;
    if deduped || missing {
        catalog.total_locations = catalog.locations.len();
        catalog.total_flavors = catalog.locations.iter().map(|l| l.flavors.len()).sum();
        catalog.total_files = catalog.locations.iter().map(|l| l.file_count()).sum();
    }

    catalog
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::notify::testing::{Level, RecordingNotifier};
    use crate::catalog::HttpCatalogSource;
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use axum::routing::get;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    struct StubSource {
        manifest_ok: AtomicBool,
        variants_ok: bool,
        manifest_calls: AtomicUsize,
    }

    impl StubSource {
        fn new(manifest_ok: bool, variants_ok: bool) -> Self {
            Self {
                manifest_ok: AtomicBool::new(manifest_ok),
                variants_ok,
                manifest_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CatalogSource for StubSource {
        fn describe(&self) -> String {
            "stub".to_string()
        }

        async fn fetch_manifest(&self) -> Result<Catalog> {
            self.manifest_calls.fetch_add(1, Ordering::SeqCst);
            if !self.manifest_ok.load(Ordering::SeqCst) {
                return Err(BrowseError::Load("HTTP 503".to_string()));
            }
            Ok(serde_json::from_value(json!({
                "locations": [
                    { "id": "a", "title": "Alpha Keep", "folder_name": "Alpha",
                      "flavors": [{ "name": "Original", "files": [{ "filename": "a.webp" }, { "filename": "b.webp" }] }] },
                    { "id": "b", "title": "Beta Mine", "folder_name": "Beta", "flavors": [] },
                    { "id": "a", "title": "Duplicate", "folder_name": "Dup", "flavors": [] }
                ],
                "worker_base_url": "https://assets.example"
            }))?)
        }

        async fn fetch_variant_map(&self) -> Result<VariantThumbnails> {
            if !self.variants_ok {
                return Err(BrowseError::Optional("HTTP 404".to_string()));
            }
            Ok(serde_json::from_value(json!({ "a": { "Original": { "a.webp": "t1" } } }))?)
        }
    }

    #[tokio::test]
    async fn test_load_success() {
        let store = CatalogStore::new(Arc::new(StubSource::new(true, true)));
        let notifier = RecordingNotifier::default();

        let summary = store.load(&notifier).await;
        assert!(summary.is_loaded());
        assert_eq!(summary.total_locations, 2);
        assert_eq!(summary.total_flavors, 1);
        assert_eq!(summary.total_files, 2);
        assert_eq!(summary.variant_thumbnails, 1);
        assert_eq!(store.catalog().location("a").unwrap().title, "Alpha Keep");
        assert!(!store.catalog().locations[0].smart_tags.is_empty());
        assert_eq!(notifier.count(Level::Error), 0);
    }

    #[tokio::test]
    async fn test_manifest_failure_leaves_empty_state() {
        let source = Arc::new(StubSource::new(true, true));
        let store = CatalogStore::new(source.clone());
        let notifier = RecordingNotifier::default();

        store.load(&notifier).await;
        assert_eq!(store.catalog().locations.len(), 2);

        source.manifest_ok.store(false, Ordering::SeqCst);
        let summary = store.load(&notifier).await;

        assert!(!summary.is_loaded());
        assert!(store.catalog().locations.is_empty());
        assert_eq!(summary.total_locations, 0);
        assert_eq!(summary.total_flavors, 0);
        assert_eq!(summary.total_files, 0);
        assert_eq!(summary.variant_thumbnails, 0);
        assert_eq!(notifier.count(Level::Error), 1);
        let error = summary.error.unwrap_or_default();
        assert_eq!(error.matches("Failed to load map catalog").count(), 1);
    }

    #[tokio::test]
    async fn test_variant_failure_is_silent() {
        let store = CatalogStore::new(Arc::new(StubSource::new(true, false)));
        let notifier = RecordingNotifier::default();

        let summary = store.load(&notifier).await;
        assert!(summary.is_loaded());
        assert_eq!(summary.total_locations, 2);
        assert!(store.variants().is_empty());
        assert!(notifier.messages.lock().is_empty());
    }

    #[tokio::test]
    async fn test_ensure_loaded_fetches_once() {
        let source = Arc::new(StubSource::new(true, true));
        let store = CatalogStore::new(source.clone());
        let notifier = RecordingNotifier::default();

        store.ensure_loaded(&notifier).await;
        store.ensure_loaded(&notifier).await;
        assert_eq!(source.manifest_calls.load(Ordering::SeqCst), 1);

        store.load(&notifier).await;
        assert_eq!(source.manifest_calls.load(Ordering::SeqCst), 2);
    }

    async fn serve(router: axum::Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn http_store(base_url: &str) -> CatalogStore {
        let source = HttpCatalogSource::new(base_url, std::time::Duration::from_secs(5)).unwrap();
        CatalogStore::new(Arc::new(source))
    }

    #[tokio::test]
    async fn test_http_503_manifest_is_load_failure() {
        let router = axum::Router::new().route(
            "/data/maps.json",
            get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
        );
        let store = http_store(&serve(router).await);
        let notifier = RecordingNotifier::default();

        let summary = store.load(&notifier).await;

        assert!(!summary.is_loaded());
        assert!(store.catalog().locations.is_empty());
        assert_eq!(summary.total_locations, 0);
        assert_eq!(summary.total_flavors, 0);
        assert_eq!(summary.total_files, 0);
        assert_eq!(notifier.count(Level::Error), 1);

        let messages = notifier.messages.lock();
        let message = &messages[0].1;
        assert!(message.contains("503"));
        assert_eq!(message.matches("Failed to load map catalog").count(), 1);
        assert_eq!(summary.error.as_deref(), Some(message.as_str()));
    }

    #[tokio::test]
    async fn test_http_variant_404_loads_silently() {
        let router = axum::Router::new().route(
            "/data/maps.json",
            get(|| async {
                axum::Json(json!({
                    "locations": [
                        { "id": "a", "title": "Alpha Keep", "folder_name": "Alpha",
                          "flavors": [{ "name": "Original", "files": [{ "filename": "a.webp" }] }] }
                    ]
                }))
            }),
        );
        let store = http_store(&serve(router).await);
        let notifier = RecordingNotifier::default();

        let summary = store.load(&notifier).await;

        assert!(summary.is_loaded());
        assert_eq!(summary.total_locations, 1);
        assert_eq!(summary.total_files, 1);
        assert!(store.variants().is_empty());
        assert!(notifier.messages.lock().is_empty());
    }

    #[test]
    fn test_duplicates_override_manifest_totals() {
        let catalog: Catalog = serde_json::from_value(json!({
            "total_locations": 3,
            "total_flavors": 2,
            "total_files": 5,
            "locations": [
                { "id": "a", "title": "Alpha", "folder_name": "Alpha",
                  "flavors": [{ "name": "Original", "files": [{ "filename": "a.webp" }] }] },
                { "id": "b", "title": "Beta", "folder_name": "Beta", "flavors": [] },
                { "id": "a", "title": "Again", "folder_name": "Again",
                  "flavors": [{ "name": "Original", "files": [{ "filename": "x.webp" }, { "filename": "y.webp" }] }] }
            ]
        }))
        .unwrap();

        let catalog = prepare(catalog);
        assert_eq!(catalog.total_locations, 2);
        assert_eq!(catalog.total_flavors, 1);
        assert_eq!(catalog.total_files, 1);
    }

    #[test]
    fn test_manifest_totals_kept_without_duplicates() {
        let catalog: Catalog = serde_json::from_value(json!({
            "total_locations": 40,
            "total_flavors": 90,
            "total_files": 300,
            "locations": [{ "id": "a", "title": "Alpha", "folder_name": "Alpha", "flavors": [] }]
        }))
        .unwrap();

        let catalog = prepare(catalog);
        assert_eq!(catalog.total_locations, 40);
        assert_eq!(catalog.total_files, 300);
    }
}
