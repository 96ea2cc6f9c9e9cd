use crate::api::error::ApiError;
use crate::config::Config;
use crate::inference::{InferencePipeline, ServingContext};
use crate::server::http::routes;
use crate::storage::open_store;
use crate::Result;
use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// 构建带中间件的应用
pub fn app(pipeline: InferencePipeline) -> Router {
    routes::create_router(pipeline).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    )
}

/// 启动 HTTP 服务器
///
/// 产物或参考表加载失败时直接返回错误，不会开始监听。
pub async fn serve(config: Config) -> Result<()> {
    let store = open_store(&config.artifacts)?;
    let context = ServingContext::build(&config, store.as_ref()).await?;
    let app = app(InferencePipeline::new(Arc::new(context)));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    Ok(())
}
