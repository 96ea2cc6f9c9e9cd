use crate::api::error::{DataLoadError, ValidationError};
use crate::api::request::RequestShape;
use crate::config::Config;
use crate::inference::{InferencePipeline, ServingContext};
use crate::storage::open_store;
use crate::Result;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

/// 本地一次性预测，走与 HTTP 服务相同的流水线
pub async fn predict(config: Config, input: &Path, basic: bool) -> Result<()> {
    let text = tokio::fs::read_to_string(input)
        .await
        .map_err(|e| DataLoadError::Unreadable {
            path: input.display().to_string(),
            reason: e.to_string(),
        })?;
    let body: Value = serde_json::from_str(&text)
        .map_err(|e| ValidationError::Malformed(format!("Invalid JSON: {}", e)))?;
    let records = match body {
        Value::Array(items) => items,
        other => vec![other],
    };

    let store = open_store(&config.artifacts)?;
    let context = ServingContext::build(&config, store.as_ref()).await?;
    let pipeline = InferencePipeline::new(Arc::new(context));
    let shape = if basic {
        RequestShape::Basic
    } else {
        RequestShape::Full
    };

    for record in &records {
        let response = pipeline.handle_json(shape, record)?;
        let rendered = serde_json::to_string_pretty(&response)
            .map_err(|e| ValidationError::Malformed(e.to_string()))?;
        println!("{}", rendered);
    }
    Ok(())
}
