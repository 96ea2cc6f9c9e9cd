//! 特征 schema
//!
//! 训练时确定的有序列名列表，是训练与服务之间的契约。持久化格式为 JSON 字符串数组。

use crate::api::error::{DataLoadError, SchemaMismatchError};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// 有序、不可变的特征列列表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct FeatureSchema {
    columns: Vec<String>,
}

impl FeatureSchema {
    /// 从训练设计矩阵的列顺序构造
    pub fn derive<I, S>(training_columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = training_columns.into_iter().map(Into::into).collect();
        Ok(Self::try_from(columns)?)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// 序列化为 JSON 数组
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&self.columns)
            .map_err(|e| SchemaMismatchError::Invalid(e.to_string()).into())
    }

    /// 从 JSON 数组解析
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| SchemaMismatchError::Invalid(e.to_string()).into())
    }

    /// 写入文件
    pub fn persist(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?).map_err(|e| {
            crate::api::error::StorageError::WriteFailed(format!("{}: {}", path.display(), e))
        })?;
        Ok(())
    }

    /// 从文件读取
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| DataLoadError::Unreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json(&text)
    }

    /// 检查某个请求形态加上参考表列能否覆盖全部 schema 列
    pub fn reconcile(
        &self,
        shape: &str,
        shape_fields: &[&str],
        reference_columns: &[String],
    ) -> Result<()> {
        let available: HashSet<&str> = shape_fields
            .iter()
            .copied()
            .chain(reference_columns.iter().map(String::as_str))
            .collect();
        let missing: Vec<String> = self
            .columns
            .iter()
            .filter(|c| !available.contains(c.as_str()))
            .cloned()
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(SchemaMismatchError::UnsatisfiedShape {
                shape: shape.to_string(),
                missing,
            }
            .into())
        }
    }

    /// 检查模型记录的特征名是否与 schema 完全一致（包括顺序）
    pub fn verify_model(&self, model_features: &[String]) -> Result<()> {
        if model_features == self.columns.as_slice() {
            Ok(())
        } else {
            Err(SchemaMismatchError::ModelDisagrees {
                model: model_features.to_vec(),
                schema: self.columns.clone(),
            }
            .into())
        }
    }
}

impl TryFrom<Vec<String>> for FeatureSchema {
    type Error = SchemaMismatchError;

    fn try_from(columns: Vec<String>) -> std::result::Result<Self, Self::Error> {
        if columns.is_empty() {
            return Err(SchemaMismatchError::Empty);
        }
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(SchemaMismatchError::DuplicateColumn(column.clone()));
            }
        }
        Ok(Self { columns })
    }
}

impl From<FeatureSchema> for Vec<String> {
    fn from(schema: FeatureSchema) -> Self {
        schema.columns
    }
}
