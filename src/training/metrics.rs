//! 回归评估指标

use crate::api::error::TrainingError;
use crate::Result;
use serde::{Deserialize, Serialize};
use smartcore::metrics;
use std::fmt;

/// 留出集上的评估结果
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    /// 平均绝对误差
    pub mae: f64,
    /// 均方误差
    pub mse: f64,
    /// 均方根误差
    pub rmse: f64,
    /// 决定系数
    pub r2: f64,
}

impl EvaluationMetrics {
    /// 计算全部指标
    pub fn compute(actual: &[f64], predicted: &[f64]) -> Result<Self> {
        if actual.len() != predicted.len() {
            return Err(TrainingError::LengthMismatch {
                rows: predicted.len(),
                targets: actual.len(),
            }
            .into());
        }
        if actual.is_empty() {
            return Err(TrainingError::InsufficientSamples {
                required: 1,
                available: 0,
            }
            .into());
        }

        let y_true = actual.to_vec();
        let y_pred = predicted.to_vec();
        let mae = metrics::mean_absolute_error(&y_true, &y_pred);
        let mse = metrics::mean_squared_error(&y_true, &y_pred);

        // 目标为常数时 SS_tot 为 0：完全拟合记 1，否则记 0
        let first = actual[0];
        let r2 = if actual.iter().all(|&y| y == first) {
            if mse == 0.0 {
                1.0
            } else {
                0.0
            }
        } else {
            metrics::r2(&y_true, &y_pred)
        };

        Ok(Self {
            mae,
            mse,
            rmse: mse.sqrt(),
            r2,
        })
    }
}

impl fmt::Display for EvaluationMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Mean Absolute Error.....: {}", thousands(self.mae))?;
        writeln!(f, "Mean Squared Error......: {}", thousands(self.mse))?;
        writeln!(f, "Root Mean Squared Error.: {}", thousands(self.rmse))?;
        write!(f, "R-squared Score.........: {:.2}", self.r2)
    }
}

/// 两位小数并带千分位分隔符
fn thousands(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (integer, fraction) = formatted.split_once('.').unwrap_or((&formatted, "00"));
    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, fraction)
}
