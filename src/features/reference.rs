//! 人口统计参考表
//!
//! 按区域编码索引，加载后只读。

use crate::api::error::DataLoadError;
use crate::features::record::RegionCode;
use crate::Result;
use std::collections::HashMap;
use std::path::Path;

/// 参考表中的一行，数值顺序与 [`ReferenceStore::columns`] 对齐
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceRow {
    values: Vec<f64>,
}

impl ReferenceRow {
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// 人口统计参考表
#[derive(Debug, Clone)]
pub struct ReferenceStore {
    columns: Vec<String>,
    rows: HashMap<RegionCode, ReferenceRow>,
    medians: ReferenceRow,
}

impl ReferenceStore {
    /// 从 CSV 文件加载
    ///
    /// 文件不可读、缺少键列、键重复、值非数值或没有数据行时返回 `DataLoadError`。
    pub fn load(path: impl AsRef<Path>, key_column: &str) -> Result<Self> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| DataLoadError::Unreadable {
                path: display.clone(),
                reason: e.to_string(),
            })?;
        Self::from_reader(reader, key_column, &display)
    }

    /// 从任意 CSV reader 加载，`source` 仅用于错误信息
    pub fn from_reader<R: std::io::Read>(
        mut reader: csv::Reader<R>,
        key_column: &str,
        source: &str,
    ) -> Result<Self> {
        let headers = reader
            .headers()
            .map_err(|e| DataLoadError::Unreadable {
                path: source.to_string(),
                reason: e.to_string(),
            })?
            .clone();

        let key_index = headers
            .iter()
            .position(|h| h == key_column)
            .ok_or_else(|| DataLoadError::MissingKeyColumn {
                path: source.to_string(),
                column: key_column.to_string(),
            })?;

        let columns: Vec<String> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != key_index)
            .map(|(_, h)| h.to_string())
            .collect();

        let mut rows = HashMap::new();
        for result in reader.records() {
            let record = result.map_err(|e| DataLoadError::Unreadable {
                path: source.to_string(),
                reason: e.to_string(),
            })?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            let code = RegionCode::new(record.get(key_index).unwrap_or_default());
            let mut values = Vec::with_capacity(columns.len());
            for (i, field) in record.iter().enumerate() {
                if i == key_index {
                    continue;
                }
                let value = field
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| DataLoadError::InvalidValue {
                        path: source.to_string(),
                        line,
                        column: headers.get(i).unwrap_or_default().to_string(),
                        value: field.to_string(),
                    })?;
                values.push(value);
            }

            if rows.contains_key(&code) {
                return Err(DataLoadError::DuplicateKey {
                    path: source.to_string(),
                    code: code.to_string(),
                }
                .into());
            }
            rows.insert(code, ReferenceRow { values });
        }

        if rows.is_empty() {
            return Err(DataLoadError::Empty(source.to_string()).into());
        }

        let medians = column_medians(&columns, &rows);
        tracing::info!(
            source,
            regions = rows.len(),
            columns = columns.len(),
            "Loaded demographic reference table"
        );

        Ok(Self {
            columns,
            rows,
            medians,
        })
    }

    /// 按区域编码查找，未命中返回 `None`
    pub fn lookup(&self, code: &RegionCode) -> Option<&ReferenceRow> {
        self.rows.get(code)
    }

    /// 人口统计列（不含键列），按文件顺序
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// 各列中位数，用于 impute-median 策略
    pub fn medians(&self) -> &ReferenceRow {
        &self.medians
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 任意一个已知区域编码（按字典序最小），用于启动时的组装探测
    pub fn sample_region(&self) -> Option<&RegionCode> {
        self.rows.keys().min()
    }
}

fn column_medians(columns: &[String], rows: &HashMap<RegionCode, ReferenceRow>) -> ReferenceRow {
    let values = (0..columns.len())
        .map(|i| {
            let mut column: Vec<f64> = rows.values().map(|r| r.values[i]).collect();
            median(&mut column)
        })
        .collect();
    ReferenceRow { values }
}

pub(crate) fn median(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HousingError;

    const DEMOGRAPHICS: &str = "\
ppltn_qty,medn_hshld_incm_amt,zipcode
1000,50000,98118
2000,70000,98028
3000,90000,98001
";

    fn store_from(text: &str) -> Result<ReferenceStore> {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());
        ReferenceStore::from_reader(reader, "zipcode", "test.csv")
    }

    #[test]
    fn test_load_and_lookup() {
        let store = store_from(DEMOGRAPHICS).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.columns(), &["ppltn_qty", "medn_hshld_incm_amt"]);

        let row = store.lookup(&RegionCode::from(98028)).unwrap();
        assert_eq!(row.values(), &[2000.0, 70000.0]);
        assert!(store.lookup(&RegionCode::from(12345)).is_none());
    }

    #[test]
    fn test_medians() {
        let store = store_from(DEMOGRAPHICS).unwrap();
        assert_eq!(store.medians().values(), &[2000.0, 70000.0]);
    }

    #[test]
    fn test_missing_key_column() {
        let err = store_from("a,b\n1,2\n").unwrap_err();
        assert!(matches!(
            err,
            HousingError::DataLoad(DataLoadError::MissingKeyColumn { .. })
        ));
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let err = store_from("a,zipcode\n1,98118\n2,98118\n").unwrap_err();
        assert!(matches!(
            err,
            HousingError::DataLoad(DataLoadError::DuplicateKey { .. })
        ));
    }

    #[test]
    fn test_non_numeric_value_rejected() {
        let err = store_from("a,zipcode\nlots,98118\n").unwrap_err();
        assert!(matches!(
            err,
            HousingError::DataLoad(DataLoadError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_unreadable_file() {
        let err = ReferenceStore::load("/nonexistent/demographics.csv", "zipcode").unwrap_err();
        assert!(matches!(
            err,
            HousingError::DataLoad(DataLoadError::Unreadable { .. })
        ));
    }

    #[test]
    fn test_empty_file_rejected() {
        let err = store_from("a,zipcode\n").unwrap_err();
        assert!(matches!(err, HousingError::DataLoad(DataLoadError::Empty(_))));
    }

    #[test]
    fn test_median_even_and_odd() {
        assert_eq!(median(&mut [3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&mut [4.0, 1.0, 3.0, 2.0]), 2.5);
    }
}
