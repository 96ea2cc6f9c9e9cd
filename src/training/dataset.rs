//! 训练数据集
//!
//! 读取销售 CSV，按配置选列，与参考表连接后得到设计矩阵与目标值。

use crate::api::error::{DataLoadError, HousingError, TrainingError, ValidationError};
use crate::config::DataConfig;
use crate::features::{join, project, FeatureSchema, MissingRegionPolicy, Record, ReferenceStore, RegionCode};
use crate::models::{feature_matrix, FeatureMatrix};
use crate::Result;
use std::collections::BTreeMap;
use std::path::Path;

/// 连接后的训练数据
#[derive(Debug, Clone)]
pub struct TrainingSet {
    pub schema: FeatureSchema,
    pub features: FeatureMatrix,
    pub targets: Vec<f64>,
    /// 因区域编码不在参考表中而丢弃的行数
    pub dropped: usize,
}

impl TrainingSet {
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// 销售数据中选中的列
struct SalesTable {
    /// 特征列（不含目标与键），按文件表头顺序
    attribute_columns: Vec<String>,
    records: Vec<Record>,
    targets: Vec<f64>,
}

/// 从文件加载训练集
pub fn load(
    config: &DataConfig,
    reference: &ReferenceStore,
    policy: MissingRegionPolicy,
) -> Result<TrainingSet> {
    let path = config.sales_path.as_path();
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| DataLoadError::Unreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
    build(reader, &display(path), config, reference, policy)
}

/// 从任意 CSV reader 构建训练集
pub fn build<R: std::io::Read>(
    reader: csv::Reader<R>,
    source: &str,
    config: &DataConfig,
    reference: &ReferenceStore,
    policy: MissingRegionPolicy,
) -> Result<TrainingSet> {
    let sales = read_sales(reader, source, config)?;

    let mut columns = sales.attribute_columns.clone();
    columns.extend(
        reference
            .columns()
            .iter()
            .filter(|c| !sales.attribute_columns.contains(c))
            .cloned(),
    );
    let schema = FeatureSchema::derive(columns)?;

    let mut values = Vec::with_capacity(sales.records.len() * schema.len());
    let mut targets = Vec::with_capacity(sales.records.len());
    let mut dropped = 0usize;
    let mut imputed = 0usize;

    for (record, target) in sales.records.iter().zip(sales.targets) {
        let joined = match join(record, reference, policy) {
            Ok(joined) => joined,
            Err(HousingError::Validation(ValidationError::UnknownRegion(_))) => {
                dropped += 1;
                continue;
            }
            Err(e) => return Err(e),
        };
        if joined.imputed() {
            imputed += 1;
        }
        let vector = project(&joined, &schema)?;
        values.extend_from_slice(vector.values());
        targets.push(target);
    }

    if dropped > 0 {
        tracing::warn!(
            dropped,
            source,
            "Dropped sales rows with no demographic data for their zipcode"
        );
    }
    if imputed > 0 {
        tracing::warn!(imputed, source, "Imputed demographic medians for sales rows");
    }
    if targets.is_empty() {
        return Err(TrainingError::InsufficientSamples {
            required: 1,
            available: 0,
        }
        .into());
    }

    tracing::info!(
        rows = targets.len(),
        features = schema.len(),
        source,
        "Assembled training set"
    );

    let features = feature_matrix(schema.len(), values)?;
    Ok(TrainingSet {
        schema,
        features,
        targets,
        dropped,
    })
}

fn read_sales<R: std::io::Read>(
    mut reader: csv::Reader<R>,
    source: &str,
    config: &DataConfig,
) -> Result<SalesTable> {
    let unreadable = |e: csv::Error| DataLoadError::Unreadable {
        path: source.to_string(),
        reason: e.to_string(),
    };
    let headers = reader.headers().map_err(unreadable)?.clone();

    for column in &config.sales_columns {
        if !headers.iter().any(|h| h == column) {
            return Err(DataLoadError::MissingColumn {
                path: source.to_string(),
                column: column.clone(),
            }
            .into());
        }
    }

    // 选中的列按文件表头顺序排列
    let selected: Vec<(usize, &str)> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| config.sales_columns.iter().any(|c| c == h))
        .collect();
    let key_index = selected
        .iter()
        .find(|(_, h)| *h == config.region_key)
        .map(|(i, _)| *i)
        .ok_or_else(|| DataLoadError::MissingKeyColumn {
            path: source.to_string(),
            column: config.region_key.clone(),
        })?;
    let target_index = selected
        .iter()
        .find(|(_, h)| *h == config.target_column)
        .map(|(i, _)| *i)
        .ok_or_else(|| DataLoadError::MissingColumn {
            path: source.to_string(),
            column: config.target_column.clone(),
        })?;
    let attributes: Vec<(usize, &str)> = selected
        .iter()
        .copied()
        .filter(|(i, _)| *i != key_index && *i != target_index)
        .collect();

    let mut records = Vec::new();
    let mut targets = Vec::new();
    for result in reader.records() {
        let row = result.map_err(unreadable)?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        let number = |index: usize, column: &str| -> Result<f64> {
            let field = row.get(index).unwrap_or_default();
            field
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| {
                    DataLoadError::InvalidValue {
                        path: source.to_string(),
                        line,
                        column: column.to_string(),
                        value: field.to_string(),
                    }
                    .into()
                })
        };

        let mut values = BTreeMap::new();
        for (index, column) in &attributes {
            values.insert(column.to_string(), number(*index, column)?);
        }
        targets.push(number(target_index, &config.target_column)?);
        let code = RegionCode::new(row.get(key_index).unwrap_or_default());
        records.push(Record::new(code, values));
    }

    if records.is_empty() {
        return Err(DataLoadError::Empty(source.to_string()).into());
    }

    Ok(SalesTable {
        attribute_columns: attributes.iter().map(|(_, c)| c.to_string()).collect(),
        records,
        targets,
    })
}

fn display(path: &Path) -> String {
    path.display().to_string()
}
