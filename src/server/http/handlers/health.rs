use crate::api::response::HealthResponse;
use axum::Json;

/// 健康检查端点
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
    })
}
