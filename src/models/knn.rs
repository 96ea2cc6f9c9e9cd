//! K 近邻回归
//!
//! 先做稳健缩放，再交给 smartcore 的 `KNNRegressor`：在缩放后的空间里按欧氏距离
//! 线性搜索最近的 k 个训练样本，预测值为这些样本目标值的均匀加权平均。

use crate::api::error::{InferenceError, TrainingError};
use crate::models::scaler::RobustScaler;
use crate::models::traits::{Estimator, Regressor};
use crate::models::types::{matrix_rows, Algorithm, FeatureMatrix};
use crate::Result;
use serde::{Deserialize, Serialize};
use smartcore::algorithm::neighbour::KNNAlgorithmName;
use smartcore::api::Predictor;
use smartcore::linalg::basic::arrays::Array;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::metrics::distance::euclidian::Euclidian;
use smartcore::neighbors::knn_regressor::{KNNRegressor, KNNRegressorParameters};
use smartcore::neighbors::KNNWeightFunction;
use std::fmt;

/// 默认近邻数
pub const DEFAULT_NEIGHBORS: usize = 5;

/// smartcore 要求 k > 1
const MIN_NEIGHBORS: usize = 2;

type Knn = KNNRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>, Euclidian<f64>>;

/// K 近邻回归的训练参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KNeighbors {
    pub n_neighbors: usize,
}

impl Default for KNeighbors {
    fn default() -> Self {
        Self {
            n_neighbors: DEFAULT_NEIGHBORS,
        }
    }
}

impl KNeighbors {
    pub fn new(n_neighbors: usize) -> Self {
        Self { n_neighbors }
    }

    fn parameters(&self) -> KNNRegressorParameters<f64, Euclidian<f64>> {
        KNNRegressorParameters::default()
            .with_k(self.n_neighbors)
            .with_algorithm(KNNAlgorithmName::LinearSearch)
            .with_weight(KNNWeightFunction::Uniform)
    }
}

/// 已训练的 K 近邻模型（包含缩放器）
#[derive(Serialize, Deserialize)]
pub struct KNeighborsModel {
    n_neighbors: usize,
    n_samples: usize,
    scaler: RobustScaler,
    knn: Knn,
}

impl fmt::Debug for KNeighborsModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KNeighborsModel")
            .field("n_neighbors", &self.n_neighbors)
            .field("n_samples", &self.n_samples)
            .field("n_features", &self.scaler.n_features())
            .finish()
    }
}

impl Estimator for KNeighbors {
    type Fitted = KNeighborsModel;

    fn fit(&self, features: &FeatureMatrix, targets: &[f64]) -> Result<KNeighborsModel> {
        if self.n_neighbors < MIN_NEIGHBORS {
            return Err(TrainingError::InvalidParameter(format!(
                "n_neighbors must be at least {}, got {}",
                MIN_NEIGHBORS, self.n_neighbors
            ))
            .into());
        }
        let (n_rows, n_features) = features.shape();
        if n_rows != targets.len() {
            return Err(TrainingError::LengthMismatch {
                rows: n_rows,
                targets: targets.len(),
            }
            .into());
        }
        if targets.len() < self.n_neighbors {
            return Err(TrainingError::InsufficientSamples {
                required: self.n_neighbors,
                available: targets.len(),
            }
            .into());
        }
        if matrix_rows(features).flatten().chain(targets.iter().copied()).any(|v| !v.is_finite()) {
            return Err(TrainingError::InvalidParameter(
                "training data contains non-finite values".to_string(),
            )
            .into());
        }

        let scaler = RobustScaler::fit(features)?;
        let scaled = scaler.transform(features)?;
        let knn = Knn::fit(&scaled, &targets.to_vec(), self.parameters()).map_err(|e| {
            TrainingError::InvalidParameter(format!("k-nearest fit failed: {}", e))
        })?;
        tracing::debug!(
            samples = targets.len(),
            features = n_features,
            n_neighbors = self.n_neighbors,
            "Fitted k-nearest regressor"
        );

        Ok(KNeighborsModel {
            n_neighbors: self.n_neighbors,
            n_samples: targets.len(),
            scaler,
            knn,
        })
    }
}

impl Regressor for KNeighborsModel {
    fn algorithm(&self) -> Algorithm {
        Algorithm::KNearest
    }

    fn feature_count(&self) -> usize {
        self.scaler.n_features()
    }

    fn predict_matrix(&self, matrix: &FeatureMatrix) -> Result<Vec<f64>> {
        let scaled = self.scaler.transform(matrix)?;
        let predictions = self
            .knn
            .predict(&scaled)
            .map_err(|e| InferenceError::Failed(format!("k-nearest prediction failed: {}", e)))?;
        if predictions.iter().any(|p| !p.is_finite()) {
            return Err(InferenceError::NonFinite("prediction".to_string()).into());
        }
        Ok(predictions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureVector;
    use crate::models::types::feature_matrix;
    use crate::HousingError;

    fn line(n: usize) -> (FeatureMatrix, Vec<f64>) {
        let xs: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let targets = xs.iter().map(|x| x * 10.0).collect();
        (feature_matrix(1, xs).unwrap(), targets)
    }

    #[test]
    fn test_predicts_mean_of_neighbors() {
        let (matrix, targets) = line(10);
        let model = KNeighbors::new(3).fit(&matrix, &targets).unwrap();

        // 最近的三个样本是 4、5、6
        let prediction = model.predict(&FeatureVector::new(vec![5.0])).unwrap();
        assert!((prediction - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_predicts_on_two_features() {
        let mut data = Vec::new();
        let mut targets = Vec::new();
        for i in 0..8 {
            data.extend_from_slice(&[i as f64, 1000.0 * (7 - i) as f64]);
            targets.push(i as f64);
        }
        let matrix = feature_matrix(2, data).unwrap();
        let model = KNeighbors::new(2).fit(&matrix, &targets).unwrap();

        // 最近的是第 0、1 个样本
        let prediction = model.predict(&FeatureVector::new(vec![0.0, 7000.0])).unwrap();
        assert!((prediction - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_deterministic() {
        let (matrix, targets) = line(25);
        let model = KNeighbors::default().fit(&matrix, &targets).unwrap();
        let vector = FeatureVector::new(vec![7.3]);
        assert_eq!(model.predict(&vector).unwrap(), model.predict(&vector).unwrap());
    }

    #[test]
    fn test_batch_matches_single_predictions() {
        let (matrix, targets) = line(12);
        let model = KNeighbors::new(3).fit(&matrix, &targets).unwrap();
        let queries = feature_matrix(1, vec![0.5, 6.2, 11.0]).unwrap();

        let batch = model.predict_batch(&queries).unwrap();
        for (x, expected) in [0.5, 6.2, 11.0].into_iter().zip(batch) {
            let single = model.predict(&FeatureVector::new(vec![x])).unwrap();
            assert!((single - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_fit_requires_enough_samples() {
        let (matrix, targets) = line(3);
        let err = KNeighbors::default().fit(&matrix, &targets).unwrap_err();
        assert!(matches!(
            err,
            HousingError::Training(TrainingError::InsufficientSamples {
                required: 5,
                available: 3
            })
        ));
    }

    #[test]
    fn test_fit_rejects_single_neighbor() {
        let (matrix, targets) = line(6);
        let err = KNeighbors::new(1).fit(&matrix, &targets).unwrap_err();
        assert!(matches!(
            err,
            HousingError::Training(TrainingError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_fit_rejects_length_mismatch() {
        let (matrix, _) = line(6);
        let err = KNeighbors::default().fit(&matrix, &[1.0; 5]).unwrap_err();
        assert!(matches!(
            err,
            HousingError::Training(TrainingError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_predict_rejects_wrong_shape() {
        let (matrix, targets) = line(6);
        let model = KNeighbors::default().fit(&matrix, &targets).unwrap();
        assert!(model.predict(&FeatureVector::new(vec![1.0, 2.0])).is_err());
    }
}
