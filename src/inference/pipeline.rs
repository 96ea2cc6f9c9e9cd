//! 推理流水线
//!
//! 校验 → 组装 → 预测 → 响应元数据。与训练共用同一套特征组装代码。

use crate::api::request::{PropertyInput, RequestShape};
use crate::api::response::PredictionResponse;
use crate::features::assemble;
use crate::inference::context::ServingContext;
use crate::models::Regressor;
use crate::Result;
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// 推理入口，可廉价克隆并在请求之间共享
#[derive(Debug, Clone)]
pub struct InferencePipeline {
    context: Arc<ServingContext>,
}

impl InferencePipeline {
    pub fn new(context: Arc<ServingContext>) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &ServingContext {
        &self.context
    }

    /// 按形态校验原始请求体后预测，响应中原样回显请求体
    pub fn handle_json(&self, shape: RequestShape, body: &Value) -> Result<PredictionResponse> {
        self.context.ensure_shape(shape)?;
        let input = PropertyInput::parse(shape, body)?;
        self.handle(&input, body.clone())
    }

    /// 对已校验的请求预测，`echo` 作为 `input_features` 返回
    pub fn handle(&self, input: &PropertyInput, echo: Value) -> Result<PredictionResponse> {
        let start = Instant::now();
        self.context.ensure_shape(input.shape())?;
        let request_id = Uuid::new_v4();

        let prediction = self.predict(input)?;
        let processing_time_ms = start.elapsed().as_secs_f64() * 1000.0;

        tracing::info!(
            %request_id,
            shape = %input.shape(),
            zipcode = %input.region_code(),
            prediction,
            processing_time_ms,
            "Prediction served"
        );

        Ok(PredictionResponse {
            prediction,
            timestamp: Utc::now(),
            request_id,
            processing_time_ms,
            input_features: echo,
        })
    }

    /// 只返回预测值
    pub fn predict(&self, input: &PropertyInput) -> Result<f64> {
        let context = &self.context;
        let vector = assemble(
            &input.to_record(),
            context.reference(),
            context.schema(),
            context.policy(),
        )?;
        context.artifact().predict(&vector)
    }
}
