use crate::api::response::ModelInfo;
use crate::inference::InferencePipeline;
use axum::extract::State;
use axum::Json;

/// 当前模型信息
pub async fn model_info(State(pipeline): State<InferencePipeline>) -> Json<ModelInfo> {
    Json(pipeline.context().model_info())
}
