//! 稳健缩放
//!
//! 每列减去中位数、除以四分位距（25%–75%），对离群值不敏感。

use crate::api::error::TrainingError;
use crate::models::types::{feature_matrix, matrix_rows, FeatureMatrix};
use crate::Result;
use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::arrays::Array;

/// 已拟合的稳健缩放器
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobustScaler {
    center: Vec<f64>,
    scale: Vec<f64>,
}

impl RobustScaler {
    /// 按列计算中位数与四分位距；四分位距为 0 的列缩放系数取 1
    pub fn fit(matrix: &FeatureMatrix) -> Result<Self> {
        let (n_rows, n_features) = matrix.shape();
        if n_rows == 0 {
            return Err(TrainingError::InsufficientSamples {
                required: 1,
                available: 0,
            }
            .into());
        }

        let mut center = Vec::with_capacity(n_features);
        let mut scale = Vec::with_capacity(n_features);
        for j in 0..n_features {
            let mut column: Vec<f64> = (0..n_rows).map(|i| *matrix.get((i, j))).collect();
            column.sort_by(|a, b| a.total_cmp(b));
            let q1 = percentile(&column, 25.0);
            let q2 = percentile(&column, 50.0);
            let q3 = percentile(&column, 75.0);
            let iqr = q3 - q1;
            center.push(q2);
            scale.push(if iqr == 0.0 { 1.0 } else { iqr });
        }

        Ok(Self { center, scale })
    }

    pub fn n_features(&self) -> usize {
        self.center.len()
    }

    pub fn transform_row(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.center.iter().zip(&self.scale))
            .map(|(x, (c, s))| (x - c) / s)
            .collect()
    }

    pub fn transform(&self, matrix: &FeatureMatrix) -> Result<FeatureMatrix> {
        let scaled: Vec<f64> = matrix_rows(matrix)
            .flat_map(|row| self.transform_row(&row))
            .collect();
        feature_matrix(self.n_features(), scaled)
    }
}

/// 已排序数据上的线性插值百分位数
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let position = (sorted.len() - 1) as f64 * q / 100.0;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}
