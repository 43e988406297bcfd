use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use mapshelf::catalog::LoadSummary;

use crate::api::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CatalogInfo {
    #[serde(flatten)]
    pub summary: LoadSummary,
    /// Effective asset origin, override first / 生效的资源源地址
    pub origin: Option<String>,
    pub source: String,
}

fn catalog_info(state: &AppState, summary: LoadSummary) -> CatalogInfo {
    let origin = state
        .config
        .origin_override()
        .or_else(|| state.store.catalog().origin())
        .map(|o| o.base().to_string());
    CatalogInfo {
        summary,
        origin,
        source: state.store.source_description(),
    }
}

/// GET /api/catalog - 目录加载状态
pub async fn get_catalog(State(state): State<Arc<AppState>>) -> Json<ApiResponse<CatalogInfo>> {
    let summary = state.store.summary();
    Json(ApiResponse::success(catalog_info(&state, summary)))
}

/// POST /api/catalog/reload - 重新加载目录
pub async fn reload_catalog(State(state): State<Arc<AppState>>) -> Json<ApiResponse<CatalogInfo>> {
    let summary = state.session.reload().await;
    if let Some(error) = summary.error.clone().filter(|_| !summary.is_loaded()) {
        return Json(ApiResponse::error(&error));
    }
    Json(ApiResponse::success(catalog_info(&state, summary)))
}
