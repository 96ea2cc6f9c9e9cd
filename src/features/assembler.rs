//! 特征组装
//!
//! 训练与服务共用同一条路径：记录与参考表左连接，然后按 schema 顺序投影。

use crate::api::error::{SchemaMismatchError, ValidationError};
use crate::features::record::Record;
use crate::features::reference::ReferenceStore;
use crate::features::schema::FeatureSchema;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 区域编码在参考表中找不到时的处理策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingRegionPolicy {
    /// 拒绝该记录
    #[default]
    Reject,
    /// 用参考表各列中位数填充
    ImputeMedian,
}

/// 左连接之后的记录，连接键已丢弃
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRecord {
    values: BTreeMap<String, f64>,
    imputed: bool,
}

impl JoinedRecord {
    pub fn get(&self, column: &str) -> Option<f64> {
        self.values.get(column).copied()
    }

    /// 人口统计字段是否来自中位数填充
    pub fn imputed(&self) -> bool {
        self.imputed
    }
}

/// 特征向量，长度与顺序都与 schema 一致
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// 记录与参考表左连接
///
/// 同名字段以记录自身的值为准。
pub fn join(
    record: &Record,
    reference: &ReferenceStore,
    policy: MissingRegionPolicy,
) -> Result<JoinedRecord> {
    let (row, imputed) = match (reference.lookup(record.region_code()), policy) {
        (Some(row), _) => (row, false),
        (None, MissingRegionPolicy::ImputeMedian) => (reference.medians(), true),
        (None, MissingRegionPolicy::Reject) => {
            return Err(ValidationError::UnknownRegion(record.region_code().to_string()).into());
        }
    };

    let mut values: BTreeMap<String, f64> = reference
        .columns()
        .iter()
        .cloned()
        .zip(row.values().iter().copied())
        .collect();
    values.extend(
        record
            .attributes()
            .iter()
            .map(|(name, value)| (name.clone(), *value)),
    );

    Ok(JoinedRecord { values, imputed })
}

/// 按 schema 顺序投影；缺列时一次性报告全部缺失列
pub fn project(joined: &JoinedRecord, schema: &FeatureSchema) -> Result<FeatureVector> {
    let mut values = Vec::with_capacity(schema.len());
    let mut missing = Vec::new();

    for column in schema.columns() {
        match joined.get(column) {
            Some(value) => values.push(value),
            None => missing.push(column.clone()),
        }
    }

    if !missing.is_empty() {
        return Err(SchemaMismatchError::MissingColumn(missing).into());
    }
    Ok(FeatureVector { values })
}

/// 连接并投影
pub fn assemble(
    record: &Record,
    reference: &ReferenceStore,
    schema: &FeatureSchema,
    policy: MissingRegionPolicy,
) -> Result<FeatureVector> {
    let joined = join(record, reference, policy)?;
    if joined.imputed() {
        tracing::warn!(
            zipcode = %record.region_code(),
            "No demographic data for region, imputing medians"
        );
    }
    project(&joined, schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::record::RegionCode;
    use crate::HousingError;

    fn reference() -> ReferenceStore {
        let text = "zipcode,ppltn_qty,medn_incm\n98118,1000,50000\n98028,3000,90000\n";
        let reader = csv::ReaderBuilder::new().from_reader(text.as_bytes());
        ReferenceStore::from_reader(reader, "zipcode", "test.csv").unwrap()
    }

    fn record(zipcode: i64) -> Record {
        let attributes = [("bedrooms", 3.0), ("sqft_living", 2000.0)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        Record::new(RegionCode::from(zipcode), attributes)
    }

    #[test]
    fn test_assemble_in_schema_order() {
        let schema = FeatureSchema::derive(["sqft_living", "medn_incm", "bedrooms", "ppltn_qty"])
            .unwrap();
        let vector = assemble(
            &record(98118),
            &reference(),
            &schema,
            MissingRegionPolicy::Reject,
        )
        .unwrap();

        assert_eq!(vector.len(), schema.len());
        assert_eq!(vector.values(), &[2000.0, 50000.0, 3.0, 1000.0]);
    }

    #[test]
    fn test_assemble_is_deterministic() {
        let schema = FeatureSchema::derive(["bedrooms", "ppltn_qty", "medn_incm"]).unwrap();
        let store = reference();
        let first = assemble(&record(98028), &store, &schema, MissingRegionPolicy::Reject).unwrap();
        let second =
            assemble(&record(98028), &store, &schema, MissingRegionPolicy::Reject).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_region_rejected() {
        let schema = FeatureSchema::derive(["bedrooms", "ppltn_qty"]).unwrap();
        let err = assemble(&record(99999), &reference(), &schema, MissingRegionPolicy::Reject)
            .unwrap_err();
        assert!(matches!(
            err,
            HousingError::Validation(ValidationError::UnknownRegion(ref code)) if code == "99999"
        ));
    }

    #[test]
    fn test_missing_region_imputed_with_medians() {
        let schema = FeatureSchema::derive(["bedrooms", "ppltn_qty", "medn_incm"]).unwrap();
        let store = reference();
        let joined = join(&record(99999), &store, MissingRegionPolicy::ImputeMedian).unwrap();
        assert!(joined.imputed());

        let vector = project(&joined, &schema).unwrap();
        assert_eq!(vector.values(), &[3.0, 2000.0, 70000.0]);
        assert!(vector.values().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_project_reports_all_missing_columns() {
        let schema = FeatureSchema::derive(["bedrooms", "grade", "view"]).unwrap();
        let err = assemble(&record(98118), &reference(), &schema, MissingRegionPolicy::Reject)
            .unwrap_err();
        match err {
            HousingError::SchemaMismatch(SchemaMismatchError::MissingColumn(columns)) => {
                assert_eq!(columns, vec!["grade".to_string(), "view".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_record_wins_on_name_collision() {
        let text = "zipcode,bedrooms\n98118,99\n";
        let reader = csv::ReaderBuilder::new().from_reader(text.as_bytes());
        let store = ReferenceStore::from_reader(reader, "zipcode", "test.csv").unwrap();
        let joined = join(&record(98118), &store, MissingRegionPolicy::Reject).unwrap();
        assert_eq!(joined.get("bedrooms"), Some(3.0));
    }
}
