//! 模型 Trait 定义
//!
//! 定义回归模型的两个能力：训练（`Estimator`）与预测（`Regressor`）。
//! 系统其他部分只依赖这两个 trait，不依赖具体算法。

use crate::api::error::InferenceError;
use crate::features::FeatureVector;
use crate::models::types::{feature_matrix, matrix_rows, Algorithm, FeatureMatrix};
use crate::Result;
use smartcore::linalg::basic::arrays::Array;

/// 已训练的回归模型
///
/// 训练完成后不可变，可在多个请求之间共享。
pub trait Regressor: Send + Sync {
    /// 算法类型
    fn algorithm(&self) -> Algorithm;

    /// 训练时的特征数
    fn feature_count(&self) -> usize;

    /// 对整个矩阵预测，调用方保证列数与取值已校验
    fn predict_matrix(&self, matrix: &FeatureMatrix) -> Result<Vec<f64>>;

    /// 单次预测
    ///
    /// 向量长度与训练时不一致、或含非有限值时返回 `InferenceError`。
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        check_row(self.feature_count(), features.values())?;
        let matrix = feature_matrix(features.len(), features.values().to_vec())?;
        self.predict_matrix(&matrix)?
            .into_iter()
            .next()
            .ok_or_else(|| InferenceError::Failed("model returned no prediction".to_string()).into())
    }

    /// 批量预测
    fn predict_batch(&self, matrix: &FeatureMatrix) -> Result<Vec<f64>> {
        let (n_rows, _) = matrix.shape();
        if n_rows == 0 {
            return Ok(Vec::new());
        }
        for row in matrix_rows(matrix) {
            check_row(self.feature_count(), &row)?;
        }
        self.predict_matrix(matrix)
    }
}

/// 回归算法的训练入口
pub trait Estimator {
    /// 训练产出的模型类型
    type Fitted: Regressor;

    /// 在特征矩阵和目标值上训练
    fn fit(&self, features: &FeatureMatrix, targets: &[f64]) -> Result<Self::Fitted>;
}

fn check_row(expected: usize, row: &[f64]) -> Result<()> {
    if row.len() != expected {
        return Err(InferenceError::ShapeMismatch {
            expected,
            actual: row.len(),
        }
        .into());
    }
    if row.iter().any(|v| !v.is_finite()) {
        return Err(InferenceError::NonFinite("feature vector".to_string()).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HousingError;

    /// 返回各特征之和的测试模型
    struct SumModel;

    impl Regressor for SumModel {
        fn algorithm(&self) -> Algorithm {
            Algorithm::KNearest
        }

        fn feature_count(&self) -> usize {
            2
        }

        fn predict_matrix(&self, matrix: &FeatureMatrix) -> Result<Vec<f64>> {
            Ok(matrix_rows(matrix).map(|row| row.iter().sum()).collect())
        }
    }

    #[test]
    fn test_predict_checks_shape() {
        let err = SumModel
            .predict(&FeatureVector::new(vec![1.0, 2.0, 3.0]))
            .unwrap_err();
        assert!(matches!(
            err,
            HousingError::Inference(InferenceError::ShapeMismatch {
                expected: 2,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_predict_rejects_nan() {
        let err = SumModel
            .predict(&FeatureVector::new(vec![1.0, f64::NAN]))
            .unwrap_err();
        assert!(matches!(err, HousingError::Inference(InferenceError::NonFinite(_))));
    }

    #[test]
    fn test_predict_single_row() {
        let prediction = SumModel.predict(&FeatureVector::new(vec![1.5, 2.0])).unwrap();
        assert_eq!(prediction, 3.5);
    }

    #[test]
    fn test_predict_batch() {
        let matrix = feature_matrix(2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(SumModel.predict_batch(&matrix).unwrap(), vec![3.0, 7.0]);

        let wide = feature_matrix(3, vec![1.0, 2.0, 3.0]).unwrap();
        assert!(SumModel.predict_batch(&wide).is_err());
    }
}
