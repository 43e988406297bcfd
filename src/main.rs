use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod state;

use mapshelf::catalog::{CatalogSource, CatalogStore, FileCatalogSource, HttpCatalogSource};
use mapshelf::config::{self, AppConfig};
use mapshelf::notify::{Notifier, TracingNotifier};
use mapshelf::session;
use state::AppState;

/// Pick the manifest source from config / 根据配置选择清单来源
fn catalog_source(app_config: &AppConfig) -> anyhow::Result<Arc<dyn CatalogSource>> {
    let catalog = &app_config.catalog;
    if app_config.is_remote_catalog() {
        let source = HttpCatalogSource::new(&catalog.base_url, app_config.request_timeout())
            .context("Failed to build HTTP catalog client")?
            .with_paths(&catalog.manifest_path, &catalog.variant_map_path);
        Ok(Arc::new(source))
    } else {
        let data_dir = app_config.get_data_dir();
        if !data_dir.exists() {
            tracing::warn!("Catalog data directory does not exist: {:?}", data_dir);
        }
        let source = FileCatalogSource::new(data_dir)
            .with_paths(&catalog.manifest_path, &catalog.variant_map_path);
        Ok(Arc::new(source))
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mapshelf=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration / 加载配置
    config::init_config().map_err(anyhow::Error::msg)?;
    let app_config = config::config();
    tracing::info!("Server will listen on {}:{}", app_config.server.host, app_config.server.port);

    let notifier: Arc<dyn Notifier> = Arc::new(TracingNotifier);
    let store = Arc::new(CatalogStore::new(catalog_source(&app_config)?));
    let state = Arc::new(AppState::new(app_config.clone(), store, notifier));

    // A failed load leaves an empty catalog; the server still starts / 加载失败仍启动
    let summary = state.session.start().await;
    if summary.is_loaded() {
        tracing::info!("Catalog ready: {} locations", summary.total_locations);
    }
    session::init(state.session.clone());

    let app = api::router(state.clone());

    let bind_addr = app_config.get_bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;

    tracing::info!("Server running at http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    session::teardown();
    Ok(())
}
