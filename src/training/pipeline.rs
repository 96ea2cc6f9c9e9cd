//! 训练流水线
//!
//! 加载 → 连接 → 划分 → 训练 → 评估。只有训练和评估都成功后才会写出产物。

use crate::api::error::ApiError;
use crate::config::Config;
use crate::features::{FeatureSchema, ReferenceStore};
use crate::models::{Estimator, KNeighbors, ModelArtifact, Regressor};
use crate::storage::ArtifactStore;
use crate::training::dataset;
use crate::training::metrics::EvaluationMetrics;
use crate::training::split::train_test_split;
use crate::Result;
use std::path::PathBuf;
use std::time::Instant;

/// 一次训练的全部产出
#[derive(Debug)]
pub struct TrainingOutcome {
    pub artifact: ModelArtifact,
    pub schema: FeatureSchema,
    pub metrics: EvaluationMetrics,
    pub n_train: usize,
    pub n_test: usize,
    /// 连接时丢弃的销售行数
    pub dropped: usize,
}

impl TrainingOutcome {
    /// 写入产物存储，返回产物目录
    pub async fn save(&self, store: &dyn ArtifactStore) -> Result<PathBuf> {
        let dir = store.save(&self.artifact, &self.schema, &self.metrics).await?;
        tracing::info!(
            store = %store.describe(),
            dir = %dir.display(),
            "Saved model artifacts"
        );
        Ok(dir)
    }
}

/// 按配置训练并评估，不做持久化
pub fn train(config: &Config) -> Result<TrainingOutcome> {
    let start = Instant::now();
    let reference = ReferenceStore::load(&config.data.demographics_path, &config.data.region_key)?;
    let set = dataset::load(&config.data, &reference, config.serving.missing_region)?;

    let split = train_test_split(
        &set.features,
        &set.targets,
        config.training.test_fraction,
        config.training.seed,
    )?;
    tracing::info!(
        n_train = split.n_train(),
        n_test = split.n_test(),
        seed = config.training.seed,
        "Split training data"
    );

    let estimator = KNeighbors::new(config.training.neighbors);
    let model = estimator.fit(&split.train_features, &split.train_targets)?;
    let predictions = model.predict_batch(&split.test_features)?;
    let metrics = EvaluationMetrics::compute(&split.test_targets, &predictions)?;

    tracing::info!(
        mae = metrics.mae,
        mse = metrics.mse,
        rmse = metrics.rmse,
        r2 = metrics.r2,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Evaluated model on held-out data"
    );

    Ok(TrainingOutcome {
        artifact: ModelArtifact::new(model, &set.schema),
        schema: set.schema,
        metrics,
        n_train: split.n_train(),
        n_test: split.n_test(),
        dropped: set.dropped,
    })
}

/// 训练并写入产物存储
///
/// 读取数据与训练都是同步计算，放到阻塞线程池里执行。
pub async fn run(config: &Config, store: &dyn ArtifactStore) -> Result<(TrainingOutcome, PathBuf)> {
    let owned = config.clone();
    let outcome = tokio::task::spawn_blocking(move || train(&owned))
        .await
        .map_err(|e| ApiError::Internal(format!("Training task failed: {}", e)))??;
    let dir = outcome.save(store).await?;
    Ok((outcome, dir))
}
