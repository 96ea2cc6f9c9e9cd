//! 服务上下文
//!
//! 启动时构建一次，之后只读，以 `Arc` 在所有请求之间共享。

use crate::api::error::{ApiError, DataLoadError};
use crate::api::request::RequestShape;
use crate::api::response::ModelInfo;
use crate::config::Config;
use crate::features::{assemble, FeatureSchema, MissingRegionPolicy, Record, ReferenceStore};
use crate::models::{ModelArtifact, Regressor};
use crate::storage::ArtifactStore;
use crate::{HousingError, Result};
use std::collections::BTreeMap;

/// 推理所需的全部只读状态
#[derive(Debug)]
pub struct ServingContext {
    reference: ReferenceStore,
    schema: FeatureSchema,
    artifact: ModelArtifact,
    policy: MissingRegionPolicy,
    shapes: Vec<RequestShape>,
    source: String,
}

impl ServingContext {
    /// 从配置和产物存储构建
    ///
    /// 参考表、schema、模型任一加载失败，或三者之间不一致时返回错误，服务不应启动。
    pub async fn build(config: &Config, store: &dyn ArtifactStore) -> Result<Self> {
        let reference =
            ReferenceStore::load(&config.data.demographics_path, &config.data.region_key)?;
        let artifact_error = |e: HousingError| DataLoadError::Artifact {
            source_name: store.describe(),
            reason: e.to_string(),
        };
        let schema = store.load_schema().await.map_err(artifact_error)?;
        let artifact = store.load_model().await.map_err(artifact_error)?;

        let mut shapes = vec![RequestShape::Full];
        if config.serving.basic_endpoint {
            shapes.push(RequestShape::Basic);
        }

        let context = Self::new(
            reference,
            schema,
            artifact,
            config.serving.missing_region,
            shapes,
            store.describe(),
        )?;
        tracing::info!(
            source = %context.source,
            features = context.schema.len(),
            regions = context.reference.len(),
            policy = ?context.policy,
            "Serving context ready"
        );
        Ok(context)
    }

    /// 由已加载的组件构建，并做启动校验
    pub fn new(
        reference: ReferenceStore,
        schema: FeatureSchema,
        artifact: ModelArtifact,
        policy: MissingRegionPolicy,
        shapes: Vec<RequestShape>,
        source: String,
    ) -> Result<Self> {
        schema.verify_model(artifact.feature_names())?;
        for shape in &shapes {
            schema.reconcile(shape.as_str(), &shape.feature_fields(), reference.columns())?;
        }

        let context = Self {
            reference,
            schema,
            artifact,
            policy,
            shapes,
            source,
        };
        context.probe()?;
        Ok(context)
    }

    /// 用一个已知区域和全零属性走一遍组装与预测
    fn probe(&self) -> Result<()> {
        let region = self
            .reference
            .sample_region()
            .cloned()
            .ok_or_else(|| DataLoadError::Empty("demographic reference table".to_string()))?;
        for shape in &self.shapes {
            let attributes: BTreeMap<String, f64> = shape
                .feature_fields()
                .into_iter()
                .map(|name| (name.to_string(), 0.0))
                .collect();
            let record = Record::new(region.clone(), attributes);
            let vector = assemble(&record, &self.reference, &self.schema, self.policy)?;
            self.artifact.predict(&vector)?;
        }
        Ok(())
    }

    pub fn reference(&self) -> &ReferenceStore {
        &self.reference
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    pub fn policy(&self) -> MissingRegionPolicy {
        self.policy
    }

    /// 检查请求形态是否开放
    pub fn ensure_shape(&self, shape: RequestShape) -> Result<()> {
        if self.shapes.contains(&shape) {
            Ok(())
        } else {
            Err(ApiError::ShapeDisabled(shape.to_string()).into())
        }
    }

    pub fn model_info(&self) -> ModelInfo {
        ModelInfo {
            algorithm: self.artifact.algorithm(),
            features: self.schema.columns().to_vec(),
            trained_at: self.artifact.trained_at(),
            shapes: self.shapes.clone(),
            missing_region: self.policy,
            source: self.source.clone(),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::models::{feature_matrix, Estimator, KNeighbors};

    pub(crate) const DEMOGRAPHICS: &str = "\
ppltn_qty,medn_hshld_incm_amt,zipcode
1000,50000,98118
2000,70000,98028
3000,90000,98001
";

    pub(crate) fn reference() -> ReferenceStore {
        let reader = csv::Reader::from_reader(DEMOGRAPHICS.as_bytes());
        ReferenceStore::from_reader(reader, "zipcode", "demographics").unwrap()
    }

    /// 在 `columns` 上训练的小模型，目标值与 sqft_living 成正比
    pub(crate) fn artifact(columns: &[&str]) -> (ModelArtifact, FeatureSchema) {
        let schema = FeatureSchema::derive(columns.iter().copied()).unwrap();
        let reference = reference();
        let mut data = Vec::new();
        let mut targets = Vec::new();
        for i in 0..12 {
            let sqft = 1000.0 + i as f64 * 100.0;
            let row: Vec<f64> = schema
                .columns()
                .iter()
                .map(|c| match c.as_str() {
                    "sqft_living" => sqft,
                    c => reference
                        .columns()
                        .iter()
                        .position(|r| r == c)
                        .map(|p| reference.medians().values()[p])
                        .unwrap_or((i % 4) as f64),
                })
                .collect();
            data.extend(row);
            targets.push(sqft * 200.0);
        }
        let matrix = feature_matrix(schema.len(), data).unwrap();
        let model = KNeighbors::new(3).fit(&matrix, &targets).unwrap();
        (ModelArtifact::new(model, &schema), schema)
    }

    pub(crate) fn context(columns: &[&str], shapes: Vec<RequestShape>) -> Result<ServingContext> {
        let (artifact, schema) = artifact(columns);
        ServingContext::new(
            reference(),
            schema,
            artifact,
            MissingRegionPolicy::Reject,
            shapes,
            "test".to_string(),
        )
    }
}
