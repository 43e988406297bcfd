use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use mapshelf::browse::{browse, BrowseSnapshot, ExpansionState, Transition, ViewContext};
use mapshelf::search::Toggles;
use mapshelf::BrowseError;

use crate::api::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub animated_only: bool,
}

/// GET /api/search - 无状态搜索，不影响会话
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Json<ApiResponse<BrowseSnapshot>> {
    let catalog = state.store.catalog();
    let variants = state.store.variants();
    let ctx = ViewContext {
        assets: &state.config.assets,
        variants: &variants,
        tag_badge_limit: state.config.search.tag_badge_limit,
    };
    let toggles = Toggles {
        animated_only: params.animated_only,
    };

    let snapshot = browse(&catalog, &params.q, toggles, &ExpansionState::new(), &ctx);
    tracing::debug!("Search {:?}: {}/{} locations", params.q, snapshot.matched, snapshot.total);
    Json(ApiResponse::success(snapshot))
}

/// GET /api/browse - 当前会话快照
pub async fn get_browse(State(state): State<Arc<AppState>>) -> Json<ApiResponse<BrowseSnapshot>> {
    Json(ApiResponse::success((*state.session.snapshot()).clone()))
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub query: String,
    /// Route through the keystroke debouncer instead of applying now / 走防抖通道
    #[serde(default)]
    pub debounce: bool,
}

/// POST /api/browse/query - 更新查询
pub async fn set_query(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QueryRequest>,
) -> Json<ApiResponse<BrowseSnapshot>> {
    if req.debounce {
        state.session.input_query(req.query);
        let mut response = ApiResponse::success((*state.session.snapshot()).clone());
        response.message = "scheduled".to_string();
        return Json(response);
    }
    let snapshot = state.session.set_query_now(req.query);
    Json(ApiResponse::success((*snapshot).clone()))
}

#[derive(Debug, Deserialize)]
pub struct AnimatedRequest {
    pub animated_only: bool,
}

/// POST /api/browse/animated - 仅动画开关
pub async fn set_animated(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnimatedRequest>,
) -> Json<ApiResponse<BrowseSnapshot>> {
    let snapshot = state.session.set_animated_only(req.animated_only);
    Json(ApiResponse::success((*snapshot).clone()))
}

#[derive(Debug, Serialize)]
pub struct ExpandResponse {
    #[serde(flatten)]
    pub transition: Transition,
    pub snapshot: BrowseSnapshot,
}

/// POST /api/browse/expand/:id - 切换展开
pub async fn toggle_expand(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Json<ApiResponse<ExpandResponse>> {
    match state.session.toggle_expanded(&id) {
        Ok((transition, snapshot)) => Json(ApiResponse::success(ExpandResponse {
            transition,
            snapshot: (*snapshot).clone(),
        })),
        Err(e @ BrowseError::LocationNotFound(_)) => Json(ApiResponse::not_found(&e.to_string())),
        Err(e) => Json(ApiResponse::error(&e.to_string())),
    }
}
