//! Browser session - query, toggles and expansion for one browsing window / 浏览会话
//!
//! Every event recomputes a `BrowseSnapshot` and publishes it on a watch channel.
//! Text input is debounced; toggles and expansion clicks apply immediately.

use std::sync::{Arc, Weak};

use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;

use crate::browse::{browse, BrowseSnapshot, ExpansionState, Transition, ViewContext};
use crate::catalog::{CatalogStore, LoadSummary};
use crate::config::{AppConfig, AssetsConfig};
use crate::debounce::Debouncer;
use crate::error::{BrowseError, Result};
use crate::notify::Notifier;
use crate::search::Toggles;

#[derive(Debug, Default)]
struct BrowseState {
    query: String,
    toggles: Toggles,
    expansion: ExpansionState,
}

pub struct BrowserSession {
    store: Arc<CatalogStore>,
    assets: AssetsConfig,
    tag_badge_limit: usize,
    notifier: Arc<dyn Notifier>,
    state: Mutex<BrowseState>,
    debouncer: Debouncer,
    snapshot_tx: watch::Sender<Arc<BrowseSnapshot>>,
}

impl BrowserSession {
    pub fn new(store: Arc<CatalogStore>, config: &AppConfig, notifier: Arc<dyn Notifier>) -> Arc<Self> {
        let (snapshot_tx, _) = watch::channel(Arc::new(BrowseSnapshot::default()));
        Arc::new(Self {
            store,
            assets: config.assets.clone(),
            tag_badge_limit: config.search.tag_badge_limit,
            notifier,
            state: Mutex::new(BrowseState::default()),
            debouncer: Debouncer::new(config.debounce()),
            snapshot_tx,
        })
    }

    pub fn store(&self) -> &Arc<CatalogStore> {
        &self.store
    }

    /// Load the catalog if needed and publish the first snapshot / 启动会话
    pub async fn start(&self) -> LoadSummary {
        let summary = self.store.ensure_loaded(self.notifier.as_ref()).await;
        self.recompute();
        summary
    }

    /// Force a manifest reload / 重新加载清单
    ///
    /// An expanded location that disappeared from the new manifest is collapsed.
    pub async fn reload(&self) -> LoadSummary {
        let summary = self.store.load(self.notifier.as_ref()).await;
        {
            let catalog = self.store.catalog();
            let mut state = self.state.lock();
            let stale = state
                .expansion
                .expanded()
                .map(|id| catalog.location(id).is_none())
                .unwrap_or(false);
            if stale {
                state.expansion.collapse();
            }
        }
        self.recompute();
        summary
    }

    /// Keystroke entry point, recomputes after the quiet period / 防抖输入
    pub fn input_query(self: &Arc<Self>, text: impl Into<String>) {
        let text = text.into();
        let session: Weak<Self> = Arc::downgrade(self);
        self.debouncer.schedule(move || {
            if let Some(session) = session.upgrade() {
                session.apply_query(text);
            }
        });
    }

    /// Apply a query immediately, dropping any pending keystrokes / 立即应用查询
    pub fn set_query_now(&self, text: impl Into<String>) -> Arc<BrowseSnapshot> {
        self.debouncer.cancel();
        self.apply_query(text.into())
    }

    fn apply_query(&self, text: String) -> Arc<BrowseSnapshot> {
        tracing::debug!("Query changed: {:?}", text);
        self.state.lock().query = text;
        self.recompute()
    }

    pub fn set_animated_only(&self, animated_only: bool) -> Arc<BrowseSnapshot> {
        self.state.lock().toggles.animated_only = animated_only;
        self.recompute()
    }

    /// Toggle expansion of a known location / 切换地点展开
    pub fn toggle_expanded(&self, id: &str) -> Result<(Transition, Arc<BrowseSnapshot>)> {
        if self.store.catalog().location(id).is_none() {
            return Err(BrowseError::LocationNotFound(id.to_string()));
        }
        let transition = self.state.lock().expansion.toggle(id);
        tracing::debug!("Expansion: {:?}", transition);
        Ok((transition, self.recompute()))
    }

    /// Latest published snapshot / 最新快照
    pub fn snapshot(&self) -> Arc<BrowseSnapshot> {
        self.snapshot_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<BrowseSnapshot>> {
        self.snapshot_tx.subscribe()
    }

    /// Drop pending work / 取消待执行的输入
    pub fn shutdown(&self) {
        if self.debouncer.cancel() {
            tracing::debug!("Pending query discarded on shutdown");
        }
    }

    fn recompute(&self) -> Arc<BrowseSnapshot> {
        let catalog = self.store.catalog();
        let variants = self.store.variants();
        let ctx = ViewContext {
            assets: &self.assets,
            variants: &variants,
            tag_badge_limit: self.tag_badge_limit,
        };

        // Publish under the state lock so the last writer is always the last sender
        let state = self.state.lock();
        let snapshot = Arc::new(browse(&catalog, &state.query, state.toggles, &state.expansion, &ctx));
        self.snapshot_tx.send_replace(snapshot.clone());
        snapshot
    }
}

// ============ Global session registry / 全局会话注册 ============

static SESSION: Lazy<RwLock<Option<Arc<BrowserSession>>>> = Lazy::new(|| RwLock::new(None));

/// Install `session` as the current one, returning the previous / 注册当前会话
pub fn init(session: Arc<BrowserSession>) -> Option<Arc<BrowserSession>> {
    let previous = SESSION.write().replace(session);
    if let Some(previous) = &previous {
        previous.shutdown();
    }
    previous
}

pub fn current() -> Option<Arc<BrowserSession>> {
    SESSION.read().clone()
}

/// Remove and shut down the current session / 注销当前会话
pub fn teardown() -> Option<Arc<BrowserSession>> {
    let session = SESSION.write().take();
    if let Some(session) = &session {
        session.shutdown();
    }
    session
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, CatalogSource, VariantThumbnails};
    use crate::notify::testing::RecordingNotifier;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    struct StaticSource {
        drop_beta: AtomicBool,
    }

    #[async_trait]
    impl CatalogSource for StaticSource {
        fn describe(&self) -> String {
            "static".to_string()
        }

        async fn fetch_manifest(&self) -> Result<Catalog> {
            let mut locations = vec![
                json!({ "id": "alpha", "title": "Alpha Keep", "folder_name": "Alpha",
                        "flavors": [{ "name": "Original", "files": [{ "filename": "a.webp" }] }] }),
                json!({ "id": "fire", "title": "Fire Temple", "folder_name": "Fire", "has_animated": true,
                        "flavors": [{ "name": "Original", "files": [{ "filename": "f.webm", "animated": true }] }] }),
            ];
            if !self.drop_beta.load(Ordering::SeqCst) {
                locations.push(json!({ "id": "beta", "title": "Beta Mine", "folder_name": "Beta", "flavors": [] }));
            }
            Ok(serde_json::from_value(json!({ "locations": locations }))?)
        }

        async fn fetch_variant_map(&self) -> Result<VariantThumbnails> {
            Ok(VariantThumbnails::default())
        }
    }

    fn session_with(source: Arc<StaticSource>) -> Arc<BrowserSession> {
        let store = Arc::new(CatalogStore::new(source));
        BrowserSession::new(store, &AppConfig::default(), Arc::new(RecordingNotifier::default()))
    }

    fn session() -> Arc<BrowserSession> {
        session_with(Arc::new(StaticSource { drop_beta: AtomicBool::new(false) }))
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounced_input_publishes_once() {
        let session = session();
        session.start().await;
        let mut rx = session.subscribe();

        for text in ["f", "fi", "fir", "fire"] {
            session.input_query(text);
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert!(!rx.has_changed().unwrap());

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(rx.has_changed().unwrap());
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.query, "fire");
        assert_eq!(snapshot.matched, 1);
        assert_eq!(snapshot.locations[0].id, "fire");
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_query_now_cancels_pending_input() {
        let session = session();
        session.start().await;

        session.input_query("alpha");
        let snapshot = session.set_query_now("beta");
        assert_eq!(snapshot.matched, 1);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(session.snapshot().query, "beta");
    }

    #[tokio::test]
    async fn test_toggle_and_expand() {
        let session = session();
        session.start().await;
        assert_eq!(session.snapshot().matched, 3);

        let snapshot = session.set_animated_only(true);
        assert_eq!(snapshot.matched, 1);

        let (transition, snapshot) = session.toggle_expanded("fire").unwrap();
        assert_eq!(transition, Transition::Expanded { id: "fire".to_string() });
        assert!(snapshot.locations[0].flavors.is_some());

        assert!(matches!(
            session.toggle_expanded("nowhere"),
            Err(BrowseError::LocationNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_reload_collapses_vanished_location() {
        let source = Arc::new(StaticSource { drop_beta: AtomicBool::new(false) });
        let session = session_with(source.clone());
        session.start().await;
        session.toggle_expanded("beta").unwrap();

        source.drop_beta.store(true, Ordering::SeqCst);
        let summary = session.reload().await;
        assert_eq!(summary.total_locations, 2);
        assert_eq!(session.snapshot().expanded, None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_events_publish_latest_state() {
        let session = session();
        session.start().await;

        let mut handles = Vec::new();
        for i in 0..8 {
            let session = session.clone();
            handles.push(tokio::spawn(async move {
                for j in 0..50 {
                    if (i + j) % 2 == 0 {
                        session.set_query_now(format!("q{}-{}", i, j));
                    } else {
                        session.set_animated_only(j % 3 == 0);
                    }
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let published = session.snapshot();
        let state = session.state.lock();
        assert_eq!(published.query, state.query);
        assert_eq!(published.toggles, state.toggles);
    }

    #[tokio::test]
    async fn test_registry_lifecycle() {
        teardown();

        let first = session();
        assert!(init(first.clone()).is_none());
        assert!(Arc::ptr_eq(&current().unwrap(), &first));

        let second = session();
        let previous = init(second.clone()).unwrap();
        assert!(Arc::ptr_eq(&previous, &first));

        let removed = teardown().unwrap();
        assert!(Arc::ptr_eq(&removed, &second));
        assert!(current().is_none());
    }
}
