//! 模型注册表
//!
//! 按名称和版本号管理训练产物，清单保存在注册表根目录的 `registry.toml` 中。
//! 每个版本的产物位于 `<root>/<name>/<version>/`。

use crate::api::error::StorageError;
use crate::features::FeatureSchema;
use crate::models::{Algorithm, ModelArtifact, Regressor};
use crate::storage::manager::{read_model, read_schema, write_bundle, ArtifactStore};
use crate::training::metrics::EvaluationMetrics;
use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// 注册表清单文件名
pub const REGISTRY_FILE: &str = "registry.toml";

/// 模型注册表
pub struct ModelRegistry {
    registry_path: PathBuf,
    models: BTreeMap<String, ModelEntry>,
}

/// 一个模型名下的全部版本
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelEntry {
    pub versions: Vec<VersionManifest>,
}

impl ModelEntry {
    pub fn latest(&self) -> Option<&VersionManifest> {
        self.versions.iter().max_by_key(|v| v.version)
    }

    pub fn get(&self, version: u32) -> Option<&VersionManifest> {
        self.versions.iter().find(|v| v.version == version)
    }
}

/// 版本清单
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionManifest {
    /// 版本号，从 1 开始递增
    pub version: u32,
    /// 产物目录（相对于注册表根目录）
    pub path: PathBuf,
    /// 算法
    pub algorithm: Algorithm,
    /// 特征数
    pub feature_count: usize,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 评估指标
    pub metrics: EvaluationMetrics,
}

/// 注册表数据（用于序列化）
#[derive(Debug, Serialize, Deserialize)]
struct RegistryData {
    version: String,
    #[serde(default)]
    models: BTreeMap<String, ModelEntry>,
}

impl ModelRegistry {
    /// 创建新的模型注册表
    pub fn new(registry_path: impl AsRef<Path>) -> Self {
        Self {
            registry_path: registry_path.as_ref().to_path_buf(),
            models: BTreeMap::new(),
        }
    }

    /// 从文件加载注册表，文件不存在时视为空注册表
    pub async fn load(&mut self) -> Result<()> {
        if !self.registry_path.exists() {
            self.models.clear();
            return Ok(());
        }

        let content = tokio::fs::read_to_string(&self.registry_path)
            .await
            .map_err(|e| {
                StorageError::ReadFailed(format!("Failed to read registry file: {}", e))
            })?;

        let registry_data: RegistryData = toml::from_str(&content).map_err(|e| {
            StorageError::InvalidFile(format!("Failed to parse registry file: {}", e))
        })?;

        self.models = registry_data.models;
        Ok(())
    }

    /// 保存注册表到文件
    pub async fn save(&self) -> Result<()> {
        if let Some(parent) = self.registry_path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::WriteFailed(format!("Failed to create registry directory: {}", e))
            })?;
        }

        let registry_data = RegistryData {
            version: "1.0".to_string(),
            models: self.models.clone(),
        };
        let content = toml::to_string_pretty(&registry_data).map_err(|e| {
            StorageError::InvalidFile(format!("Failed to serialize registry: {}", e))
        })?;

        let tmp = self.registry_path.with_extension("toml.tmp");
        tokio::fs::write(&tmp, content).await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to write registry file: {}", e))
        })?;
        tokio::fs::rename(&tmp, &self.registry_path)
            .await
            .map_err(|e| {
                StorageError::WriteFailed(format!("Failed to write registry file: {}", e))
            })?;

        Ok(())
    }

    /// 下一个可用版本号
    pub fn next_version(&self, name: &str) -> u32 {
        self.models
            .get(name)
            .and_then(ModelEntry::latest)
            .map(|v| v.version + 1)
            .unwrap_or(1)
    }

    /// 注册新版本
    pub async fn register(&mut self, name: &str, manifest: VersionManifest) -> Result<()> {
        let entry = self.models.entry(name.to_string()).or_default();
        if entry.get(manifest.version).is_some() {
            return Err(StorageError::WriteFailed(format!(
                "{} version {} is already registered",
                name, manifest.version
            ))
            .into());
        }
        entry.versions.push(manifest);
        self.save().await
    }

    /// 获取模型条目
    pub fn get(&self, name: &str) -> Option<&ModelEntry> {
        self.models.get(name)
    }

    /// 按版本选择器解析
    pub fn resolve(&self, name: &str, selector: VersionSelector) -> Option<&VersionManifest> {
        let entry = self.models.get(name)?;
        match selector {
            VersionSelector::Latest => entry.latest(),
            VersionSelector::Exact(version) => entry.get(version),
        }
    }

    /// 列出所有模型
    pub fn list(&self) -> impl Iterator<Item = (&String, &ModelEntry)> {
        self.models.iter()
    }
}

/// 版本选择器：`latest` 或具体版本号
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSelector {
    Latest,
    Exact(u32),
}

impl FromStr for VersionSelector {
    type Err = StorageError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("latest") {
            return Ok(Self::Latest);
        }
        s.parse::<u32>()
            .ok()
            .filter(|v| *v > 0)
            .map(Self::Exact)
            .ok_or_else(|| StorageError::InvalidFile(format!("invalid model version '{}'", s)))
    }
}

impl fmt::Display for VersionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str("latest"),
            Self::Exact(v) => write!(f, "{}", v),
        }
    }
}

/// 基于注册表的产物存储
pub struct RegistryArtifactStore {
    root: PathBuf,
    model_name: String,
    selector: VersionSelector,
}

impl RegistryArtifactStore {
    pub fn new(root: impl AsRef<Path>, model_name: impl Into<String>, selector: VersionSelector) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            model_name: model_name.into(),
            selector,
        }
    }

    /// 打开注册表
    pub async fn registry(&self) -> Result<ModelRegistry> {
        let mut registry = ModelRegistry::new(self.root.join(REGISTRY_FILE));
        registry.load().await?;
        Ok(registry)
    }

    async fn resolve_dir(&self) -> Result<PathBuf> {
        let registry = self.registry().await?;
        let manifest = registry
            .resolve(&self.model_name, self.selector)
            .ok_or_else(|| {
                StorageError::NotFound(format!("{} version {}", self.model_name, self.selector))
            })?;
        tracing::debug!(
            model = %self.model_name,
            version = manifest.version,
            "Resolved registered model"
        );
        Ok(self.root.join(&manifest.path))
    }
}

#[async_trait]
impl ArtifactStore for RegistryArtifactStore {
    async fn load_model(&self) -> Result<ModelArtifact> {
        let dir = self.resolve_dir().await?;
        read_model(&dir.join(crate::storage::manager::MODEL_FILE)).await
    }

    async fn load_schema(&self) -> Result<FeatureSchema> {
        let dir = self.resolve_dir().await?;
        read_schema(&dir.join(crate::storage::manager::FEATURES_FILE)).await
    }

    async fn save(
        &self,
        artifact: &ModelArtifact,
        schema: &FeatureSchema,
        metrics: &EvaluationMetrics,
    ) -> Result<PathBuf> {
        let mut registry = self.registry().await?;
        let version = registry.next_version(&self.model_name);
        let relative = PathBuf::from(&self.model_name).join(version.to_string());
        let dir = self.root.join(&relative);

        // 先写入暂存目录，完整写完后整体改名，避免出现半个版本
        let staging = self
            .root
            .join(&self.model_name)
            .join(format!(".{}.staging", version));
        tokio::fs::create_dir_all(&staging).await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to create {}: {}", staging.display(), e))
        })?;
        if let Err(e) = write_bundle(&staging, artifact, schema, metrics).await {
            let _ = tokio::fs::remove_dir_all(&staging).await;
            return Err(e);
        }
        if let Err(e) = tokio::fs::rename(&staging, &dir).await {
            let _ = tokio::fs::remove_dir_all(&staging).await;
            return Err(StorageError::WriteFailed(format!(
                "Failed to publish {}: {}",
                dir.display(),
                e
            ))
            .into());
        }

        let manifest = VersionManifest {
            version,
            path: relative,
            algorithm: artifact.algorithm(),
            feature_count: artifact.feature_count(),
            created_at: artifact.trained_at(),
            metrics: *metrics,
        };
        // 登记失败时撤回已发布的版本目录
        if let Err(e) = registry.register(&self.model_name, manifest).await {
            let _ = tokio::fs::remove_dir_all(&dir).await;
            return Err(e);
        }

        tracing::info!(model = %self.model_name, version, "Registered model version");
        Ok(dir)
    }

    fn describe(&self) -> String {
        format!(
            "registry:{}/{}@{}",
            self.root.display(),
            self.model_name,
            self.selector
        )
    }
}
