//! 产物存储
//!
//! 提供统一的产物存储接口：训练写入模型、特征 schema 与评估指标，服务启动时读取。

use crate::api::error::StorageError;
use crate::features::FeatureSchema;
use crate::models::ModelArtifact;
use crate::training::metrics::EvaluationMetrics;
use crate::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// 模型文件名
pub const MODEL_FILE: &str = "model.bin";
/// 特征 schema 文件名
pub const FEATURES_FILE: &str = "model_features.json";
/// 评估指标文件名
pub const METRICS_FILE: &str = "metrics.json";

/// 存储 trait - 定义产物读写的统一接口
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// 读取模型
    async fn load_model(&self) -> Result<ModelArtifact>;

    /// 读取特征 schema
    async fn load_schema(&self) -> Result<FeatureSchema>;

    /// 保存一次完整训练的全部产物，返回产物所在目录
    async fn save(
        &self,
        artifact: &ModelArtifact,
        schema: &FeatureSchema,
        metrics: &EvaluationMetrics,
    ) -> Result<PathBuf>;

    /// 人类可读的位置描述
    fn describe(&self) -> String;
}

/// 本地目录存储实现
pub struct LocalArtifactStore {
    dir: PathBuf,
}

impl LocalArtifactStore {
    /// 创建新的本地目录存储
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl ArtifactStore for LocalArtifactStore {
    async fn load_model(&self) -> Result<ModelArtifact> {
        read_model(&self.dir.join(MODEL_FILE)).await
    }

    async fn load_schema(&self) -> Result<FeatureSchema> {
        read_schema(&self.dir.join(FEATURES_FILE)).await
    }

    async fn save(
        &self,
        artifact: &ModelArtifact,
        schema: &FeatureSchema,
        metrics: &EvaluationMetrics,
    ) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            StorageError::WriteFailed(format!(
                "Failed to create artifact directory {}: {}",
                self.dir.display(),
                e
            ))
        })?;
        write_bundle(&self.dir, artifact, schema, metrics).await?;
        Ok(self.dir.clone())
    }

    fn describe(&self) -> String {
        format!("local:{}", self.dir.display())
    }
}

/// 读取并解码模型文件
pub(crate) async fn read_model(path: &Path) -> Result<ModelArtifact> {
    let bytes = tokio::fs::read(path).await.map_err(|e| read_error(path, e))?;
    ModelArtifact::from_bytes(&bytes)
}

/// 读取并解析特征 schema 文件
pub(crate) async fn read_schema(path: &Path) -> Result<FeatureSchema> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| read_error(path, e))?;
    FeatureSchema::from_json(&text)
}

fn read_error(path: &Path, e: std::io::Error) -> StorageError {
    if e.kind() == std::io::ErrorKind::NotFound {
        StorageError::NotFound(path.display().to_string())
    } else {
        StorageError::ReadFailed(format!("{}: {}", path.display(), e))
    }
}

/// 先把全部文件写成临时文件，全部成功后再逐个重命名
///
/// 任一步失败都会清理尚未就位的临时文件。
pub(crate) async fn write_bundle(
    dir: &Path,
    artifact: &ModelArtifact,
    schema: &FeatureSchema,
    metrics: &EvaluationMetrics,
) -> Result<()> {
    let metrics_json = serde_json::to_vec_pretty(metrics)
        .map_err(|e| StorageError::WriteFailed(format!("Failed to encode metrics: {}", e)))?;
    let files = [
        (MODEL_FILE, artifact.to_bytes()?),
        (FEATURES_FILE, schema.to_json()?.into_bytes()),
        (METRICS_FILE, metrics_json),
    ];

    let mut staged = Vec::with_capacity(files.len());
    for (name, contents) in &files {
        let tmp = dir.join(format!(".{}.tmp", name));
        if let Err(e) = tokio::fs::write(&tmp, contents).await {
            for (path, _) in &staged {
                let _ = tokio::fs::remove_file(path).await;
            }
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(StorageError::WriteFailed(format!("{}: {}", tmp.display(), e)).into());
        }
        staged.push((tmp, dir.join(name)));
    }

    for (i, (tmp, target)) in staged.iter().enumerate() {
        if let Err(e) = tokio::fs::rename(tmp, target).await {
            for (pending, _) in &staged[i..] {
                let _ = tokio::fs::remove_file(pending).await;
            }
            tracing::error!(
                dir = %dir.display(),
                file = %target.display(),
                "Artifact bundle left incomplete"
            );
            return Err(StorageError::WriteFailed(format!("{}: {}", target.display(), e)).into());
        }
    }

    tracing::debug!(dir = %dir.display(), "Wrote artifact bundle");
    Ok(())
}
