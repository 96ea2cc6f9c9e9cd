use crate::api::error::ValidationError;
use crate::api::request::RequestShape;
use crate::api::response::PredictionResponse;
use crate::inference::InferencePipeline;
use crate::Result;
use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde_json::Value;

/// 完整形态预测端点
pub async fn predict_full(
    State(pipeline): State<InferencePipeline>,
    body: Bytes,
) -> Result<Json<PredictionResponse>> {
    predict(&pipeline, RequestShape::Full, &body)
}

/// 基础形态预测端点
pub async fn predict_basic(
    State(pipeline): State<InferencePipeline>,
    body: Bytes,
) -> Result<Json<PredictionResponse>> {
    predict(&pipeline, RequestShape::Basic, &body)
}

fn predict(
    pipeline: &InferencePipeline,
    shape: RequestShape,
    body: &[u8],
) -> Result<Json<PredictionResponse>> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ValidationError::Malformed(format!("Invalid JSON: {}", e)))?;
    pipeline.handle_json(shape, &value).map(Json)
}
