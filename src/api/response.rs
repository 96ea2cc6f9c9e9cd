use crate::api::request::RequestShape;
use crate::features::MissingRegionPolicy;
use crate::models::Algorithm;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// 预测响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    /// 预测价格
    pub prediction: f64,
    pub timestamp: DateTime<Utc>,
    pub request_id: Uuid,
    /// 处理耗时（毫秒）
    pub processing_time_ms: f64,
    /// 原样回显的输入字段
    pub input_features: Value,
}

/// 当前加载的模型信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub algorithm: Algorithm,
    pub features: Vec<String>,
    pub trained_at: DateTime<Utc>,
    pub shapes: Vec<RequestShape>,
    pub missing_region: MissingRegionPolicy,
    /// 产物来源描述
    pub source: String,
}

/// 健康检查响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
