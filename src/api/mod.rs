pub mod browse;
pub mod catalog;
pub mod scenes;
pub mod server;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: 200,
            message: "success".to_string(),
            data: Some(data),
        }
    }

    pub fn error(message: &str) -> Self {
        Self {
            code: 400,
            message: message.to_string(),
            data: None,
        }
    }

    /// Missing catalog entries / 目录条目不存在
    pub fn not_found(message: &str) -> Self {
        Self {
            code: 404,
            message: message.to_string(),
            data: None,
        }
    }
}

/// Build the HTTP router / 构建路由
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(server::health_check))
        .route("/api/catalog", get(catalog::get_catalog))
        .route("/api/catalog/reload", post(catalog::reload_catalog))
        .route("/api/search", get(browse::search))
        .route("/api/browse", get(browse::get_browse))
        .route("/api/browse/query", post(browse::set_query))
        .route("/api/browse/animated", post(browse::set_animated))
        .route("/api/browse/expand/:id", post(browse::toggle_expand))
        .route("/api/scenes/payload", post(scenes::build_payload))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
