use std::sync::Arc;

use mapshelf::catalog::CatalogStore;
use mapshelf::config::AppConfig;
use mapshelf::notify::Notifier;
use mapshelf::session::BrowserSession;

/// Shared handler state / 处理器共享状态
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<CatalogStore>,
    pub session: Arc<BrowserSession>,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<CatalogStore>, notifier: Arc<dyn Notifier>) -> Self {
        let session = BrowserSession::new(store.clone(), &config, notifier.clone());
        Self {
            config,
            store,
            session,
            notifier,
        }
    }
}
