//! 模型产物
//!
//! 训练产出的不可变模型，记录训练时的特征名，序列化为二进制文件。
//! 文件布局：4 字节魔数 + 4 字节小端格式版本 + bincode 编码的正文。

use crate::api::error::StorageError;
use crate::features::{FeatureSchema, FeatureVector};
use crate::models::knn::KNeighborsModel;
use crate::models::traits::Regressor;
use crate::models::types::{Algorithm, FeatureMatrix};
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const MAGIC: &[u8; 4] = b"HPMA";

/// 当前产物格式版本
pub const FORMAT_VERSION: u32 = 1;

/// 具体的已训练模型
#[derive(Debug, Serialize, Deserialize)]
pub enum FittedModel {
    KNearest(KNeighborsModel),
}

impl FittedModel {
    fn as_regressor(&self) -> &dyn Regressor {
        match self {
            FittedModel::KNearest(model) => model,
        }
    }
}

impl From<KNeighborsModel> for FittedModel {
    fn from(model: KNeighborsModel) -> Self {
        FittedModel::KNearest(model)
    }
}

/// 模型产物
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelArtifact {
    feature_names: Vec<String>,
    trained_at: DateTime<Utc>,
    model: FittedModel,
}

impl ModelArtifact {
    /// 用已训练模型和训练 schema 构造
    pub fn new(model: impl Into<FittedModel>, schema: &FeatureSchema) -> Self {
        Self {
            feature_names: schema.columns().to_vec(),
            trained_at: Utc::now(),
            model: model.into(),
        }
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }

    /// 编码为二进制
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let body = bincode::serialize(self)
            .map_err(|e| StorageError::WriteFailed(format!("Failed to encode model: {}", e)))?;
        let mut bytes = Vec::with_capacity(body.len() + 8);
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&body);
        Ok(bytes)
    }

    /// 从二进制解码，魔数或版本不符时拒绝
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 8 || &bytes[..4] != MAGIC {
            return Err(StorageError::InvalidFile("not a model artifact".to_string()).into());
        }
        let mut version = [0u8; 4];
        version.copy_from_slice(&bytes[4..8]);
        let version = u32::from_le_bytes(version);
        if version != FORMAT_VERSION {
            return Err(StorageError::InvalidFile(format!(
                "unsupported artifact version {} (expected {})",
                version, FORMAT_VERSION
            ))
            .into());
        }

        let artifact: Self = bincode::deserialize(&bytes[8..])
            .map_err(|e| StorageError::InvalidFile(format!("Failed to decode model: {}", e)))?;
        if artifact.feature_names.len() != artifact.feature_count() {
            return Err(StorageError::InvalidFile(format!(
                "model records {} feature names but expects {} features",
                artifact.feature_names.len(),
                artifact.feature_count()
            ))
            .into());
        }
        Ok(artifact)
    }
}

impl Regressor for ModelArtifact {
    fn algorithm(&self) -> Algorithm {
        self.model.as_regressor().algorithm()
    }

    fn feature_count(&self) -> usize {
        self.model.as_regressor().feature_count()
    }

    fn predict_matrix(&self, matrix: &FeatureMatrix) -> Result<Vec<f64>> {
        self.model.as_regressor().predict_matrix(matrix)
    }

    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        self.model.as_regressor().predict(features)
    }

    fn predict_batch(&self, matrix: &FeatureMatrix) -> Result<Vec<f64>> {
        self.model.as_regressor().predict_batch(matrix)
    }
}
