use crate::inference::InferencePipeline;
use crate::server::http::handlers;
use axum::routing::{get, post};
use axum::Router;

/// 定义路由
pub fn create_router(pipeline: InferencePipeline) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/model", get(handlers::model_info))
        .route("/predict", post(handlers::predict_full))
        .route("/predict/", post(handlers::predict_full))
        .route("/predict/basic", post(handlers::predict_basic))
        .with_state(pipeline)
}
