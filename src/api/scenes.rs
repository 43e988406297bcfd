use std::sync::Arc;

use async_trait::async_trait;
use axum::{extract::State, Json};
use serde::Deserialize;

use mapshelf::scene::{Dimensions, MediaKind, MediaProbe, PreparedScene, ScenePlanner, SceneRequest};
use mapshelf::{BrowseError, Result};

use crate::api::ApiResponse;
use crate::state::AppState;

/// Size measured by the client that rendered the media / 客户端上报的媒体尺寸
struct ClientProbe(Option<Dimensions>);

#[async_trait]
impl MediaProbe for ClientProbe {
    async fn probe_dimensions(&self, _url: &str, _kind: MediaKind) -> Result<Dimensions> {
        self.0
            .ok_or_else(|| BrowseError::Probe("media size not reported by client".to_string()))
    }
}

#[derive(Debug, Deserialize)]
pub struct PayloadRequest {
    #[serde(flatten)]
    pub scene: SceneRequest,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// POST /api/scenes/payload - 构建场景载荷
pub async fn build_payload(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PayloadRequest>,
) -> Json<ApiResponse<PreparedScene>> {
    let reported = match (req.width, req.height) {
        (Some(width), Some(height)) => Some(Dimensions { width, height }),
        _ => None,
    };
    let planner = ScenePlanner::new(
        &state.config,
        Arc::new(ClientProbe(reported)),
        state.notifier.clone(),
    );

    let catalog = state.store.catalog();
    match planner.prepare(&catalog, &req.scene).await {
        Ok(prepared) => Json(ApiResponse::success(prepared)),
        Err(e) => {
            planner.report(&e);
            if e.is_missing_data() {
                Json(ApiResponse::not_found(&e.to_string()))
            } else {
                Json(ApiResponse::error(&e.to_string()))
            }
        }
    }
}
