use axum::Json;
use serde_json::{json, Value};

/// GET /api/health - 健康检查
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "build_time": env!("BUILD_TIME"),
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::Method;

    use crate::api::testing::{app, call};

    #[tokio::test]
    async fn test_health() {
        let app = app().await;
        let body = call(&app, Method::GET, "/api/health", None).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }
}
