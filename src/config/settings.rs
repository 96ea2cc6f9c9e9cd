use crate::api::error::ConfigError;
use crate::config::defaults::*;
use crate::features::MissingRegionPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 主配置结构
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub training: TrainingConfig,
    pub serving: ServingConfig,
    pub artifacts: ArtifactsConfig,
    pub logging: LoggingConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// 数据源配置
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DataConfig {
    /// 房屋销售 CSV
    pub sales_path: PathBuf,
    /// 邮编人口统计 CSV
    pub demographics_path: PathBuf,
    /// 连接键列名
    pub region_key: String,
    /// 目标列名
    pub target_column: String,
    /// 从销售数据中选取的列（必须包含目标列和连接键）
    pub sales_columns: Vec<String>,
}

/// 训练配置
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// 留出评估集的比例
    pub test_fraction: f64,
    /// 划分随机种子
    pub seed: u64,
    /// K 近邻数
    pub neighbors: usize,
}

/// 服务配置
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServingConfig {
    /// 区域编码不在参考表中时的处理策略
    pub missing_region: MissingRegionPolicy,
    /// 是否开放基础请求形态（`/predict/basic`）
    pub basic_endpoint: bool,
}

/// 产物来源
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactSource {
    /// 本地目录
    #[default]
    Local,
    /// 本地版本化注册表
    Registry,
}

/// 产物配置
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    pub source: ArtifactSource,
    /// `local` 模式下的产物目录
    pub output_dir: PathBuf,
    /// `registry` 模式下的注册表根目录
    pub registry_root: PathBuf,
    pub model_name: String,
    /// 版本号，或 `latest`
    pub model_version: String,
}

/// 日志配置
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub output: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            sales_path: PathBuf::from(DEFAULT_SALES_PATH),
            demographics_path: PathBuf::from(DEFAULT_DEMOGRAPHICS_PATH),
            region_key: DEFAULT_REGION_KEY.to_string(),
            target_column: DEFAULT_TARGET_COLUMN.to_string(),
            sales_columns: DEFAULT_SALES_COLUMNS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_fraction: DEFAULT_TEST_FRACTION,
            seed: DEFAULT_SEED,
            neighbors: DEFAULT_NEIGHBORS,
        }
    }
}

impl Default for ServingConfig {
    fn default() -> Self {
        Self {
            missing_region: MissingRegionPolicy::Reject,
            basic_endpoint: true,
        }
    }
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            source: ArtifactSource::Local,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            registry_root: PathBuf::from(DEFAULT_REGISTRY_ROOT),
            model_name: DEFAULT_MODEL_NAME.to_string(),
            model_version: DEFAULT_MODEL_VERSION.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            format: DEFAULT_LOG_FORMAT.to_string(),
            output: vec!["stdout".to_string()],
        }
    }
}

impl Config {
    /// 从文件加载配置（环境变量覆盖文件）
    pub fn from_file(path: &str) -> crate::Result<Self> {
        crate::config::loader::load_from_file(path)
    }

    /// 从环境变量加载配置
    pub fn from_env() -> crate::Result<Self> {
        crate::config::loader::load_from_env()
    }

    /// 校验取值范围
    pub fn validate(&self) -> crate::Result<()> {
        let fraction = self.training.test_fraction;
        if !(fraction > 0.0 && fraction < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "training.test_fraction must be in (0, 1), got {}",
                fraction
            ))
            .into());
        }
        if self.training.neighbors < 2 {
            return Err(ConfigError::Invalid(format!(
                "training.neighbors must be at least 2, got {}",
                self.training.neighbors
            ))
            .into());
        }
        for required in [&self.data.target_column, &self.data.region_key] {
            if !self.data.sales_columns.contains(required) {
                return Err(ConfigError::Invalid(format!(
                    "data.sales_columns must include '{}'",
                    required
                ))
                .into());
            }
        }
        if self.artifacts.model_name.trim().is_empty() {
            return Err(ConfigError::Invalid("artifacts.model_name must not be empty".to_string()).into());
        }
        Ok(())
    }
}
