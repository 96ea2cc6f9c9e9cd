//! 可复现的训练/评估划分

use crate::api::error::TrainingError;
use crate::models::FeatureMatrix;
use crate::Result;
use smartcore::linalg::basic::arrays::Array;
use smartcore::model_selection;

/// 一次划分的结果
#[derive(Debug, Clone)]
pub struct Split {
    pub train_features: FeatureMatrix,
    pub train_targets: Vec<f64>,
    pub test_features: FeatureMatrix,
    pub test_targets: Vec<f64>,
}

impl Split {
    pub fn n_train(&self) -> usize {
        self.train_targets.len()
    }

    pub fn n_test(&self) -> usize {
        self.test_targets.len()
    }
}

/// 评估集行数：`floor(n * test_fraction)`，按 f32 计算
pub fn test_size(n: usize, test_fraction: f64) -> usize {
    (n as f32 * test_fraction as f32) as usize
}

/// 按种子打乱后划分，打乱后的前 `test_size` 行作为评估集
///
/// 相同的种子和输入总是得到相同的划分。两个分区都至少有一行。
pub fn train_test_split(
    features: &FeatureMatrix,
    targets: &[f64],
    test_fraction: f64,
    seed: u64,
) -> Result<Split> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(TrainingError::InvalidParameter(format!(
            "test_fraction must be in (0, 1), got {}",
            test_fraction
        ))
        .into());
    }
    let n = targets.len();
    let (n_rows, _) = features.shape();
    if n_rows != n {
        return Err(TrainingError::LengthMismatch {
            rows: n_rows,
            targets: n,
        }
        .into());
    }

    let n_test = test_size(n, test_fraction);
    if n_test == 0 || n_test >= n {
        return Err(TrainingError::InsufficientSamples {
            required: (1.0 / test_fraction).ceil() as usize,
            available: n,
        }
        .into());
    }

    let targets = targets.to_vec();
    let (train_features, test_features, train_targets, test_targets) =
        model_selection::train_test_split(features, &targets, test_fraction as f32, true, Some(seed));

    Ok(Split {
        train_features,
        train_targets,
        test_features,
        test_targets,
    })
}
