//! 房屋记录
//!
//! 校验之后的类型化记录：区域编码 + 数值属性。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 区域编码（邮编），连接房屋记录与人口统计数据的键
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionCode(String);

impl RegionCode {
    /// 从原始字符串构造，去掉首尾空白；整数形式的浮点（如 `98118.0`）归一为整数
    pub fn new(raw: impl AsRef<str>) -> Self {
        let trimmed = raw.as_ref().trim();
        match trimmed.parse::<f64>() {
            Ok(value) if value.fract() == 0.0 && value.is_finite() && !trimmed.contains('e') => {
                Self(format!("{}", value as i64))
            }
            _ => Self(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<i64> for RegionCode {
    fn from(code: i64) -> Self {
        Self(code.to_string())
    }
}

impl fmt::Display for RegionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 一条房屋记录
///
/// 区域编码单独存放，不会出现在 `attributes` 中，相当于连接之后丢弃连接键。
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    region_code: RegionCode,
    attributes: BTreeMap<String, f64>,
}

impl Record {
    pub fn new(region_code: RegionCode, attributes: BTreeMap<String, f64>) -> Self {
        Self {
            region_code,
            attributes,
        }
    }

    pub fn region_code(&self) -> &RegionCode {
        &self.region_code
    }

    pub fn attributes(&self) -> &BTreeMap<String, f64> {
        &self.attributes
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.attributes.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_code_normalization() {
        assert_eq!(RegionCode::new(" 98118 "), RegionCode::from(98118));
        assert_eq!(RegionCode::new("98118.0"), RegionCode::from(98118));
        assert_eq!(RegionCode::new("A1B").as_str(), "A1B");
    }

    #[test]
    fn test_record_accessors() {
        let mut attributes = BTreeMap::new();
        attributes.insert("bedrooms".to_string(), 3.0);
        let record = Record::new(RegionCode::from(98028), attributes);

        assert_eq!(record.region_code().as_str(), "98028");
        assert_eq!(record.get("bedrooms"), Some(3.0));
        assert_eq!(record.get("zipcode"), None);
    }
}
