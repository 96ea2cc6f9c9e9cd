//! 模型类型定义
//!
//! 定义回归算法枚举与训练用的特征矩阵。特征矩阵直接使用 smartcore 的 `DenseMatrix`。

use crate::api::error::TrainingError;
use crate::Result;
use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::arrays::Array;
use smartcore::linalg::basic::matrix::DenseMatrix;
use std::fmt;

/// 回归算法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    /// RobustScaler + K 近邻回归
    KNearest,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::KNearest => f.write_str("k-nearest"),
        }
    }
}

/// 特征矩阵（行 = 样本，列 = schema 中的特征）
pub type FeatureMatrix = DenseMatrix<f64>;

/// 由行优先排列的数据构造特征矩阵
pub fn feature_matrix(n_features: usize, data: Vec<f64>) -> Result<FeatureMatrix> {
    if n_features == 0 || data.len() % n_features != 0 {
        return Err(TrainingError::InvalidParameter(format!(
            "{} values cannot be laid out in rows of {} features",
            data.len(),
            n_features
        ))
        .into());
    }
    Ok(DenseMatrix::new(data.len() / n_features, n_features, data, false))
}

/// 取第 `index` 行
pub fn matrix_row(matrix: &FeatureMatrix, index: usize) -> Vec<f64> {
    let (_, n_features) = matrix.shape();
    (0..n_features).map(|j| *matrix.get((index, j))).collect()
}

/// 按顺序遍历所有行
pub fn matrix_rows(matrix: &FeatureMatrix) -> impl Iterator<Item = Vec<f64>> + '_ {
    let (n_rows, _) = matrix.shape();
    (0..n_rows).map(move |i| matrix_row(matrix, i))
}
