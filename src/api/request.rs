use crate::api::error::{FieldViolation, ValidationError};
use crate::features::{Record, RegionCode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// 请求形态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestShape {
    /// 8 个结构字段
    Basic,
    /// 基础字段加上朝向、品质、年代、坐标等
    Full,
}

/// 字段的数值类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Float,
    Integer,
}

/// 字段定义
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

const fn float(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::Float,
    }
}

const fn integer(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::Integer,
    }
}

/// 区域编码字段名
pub const REGION_FIELD: &str = "zipcode";

const BASIC_FIELDS: &[FieldSpec] = &[
    float("bedrooms"),
    float("bathrooms"),
    integer("sqft_living"),
    integer("sqft_lot"),
    float("floors"),
    integer("sqft_above"),
    integer("sqft_basement"),
    integer(REGION_FIELD),
];

const EXTENDED_FIELDS: &[FieldSpec] = &[
    integer("waterfront"),
    integer("view"),
    integer("condition"),
    integer("grade"),
    integer("yr_built"),
    integer("yr_renovated"),
    float("lat"),
    float("long"),
    integer("sqft_living15"),
    integer("sqft_lot15"),
];

impl RequestShape {
    /// 该形态的字段定义
    pub fn fields(self) -> impl Iterator<Item = &'static FieldSpec> {
        let extended: &'static [FieldSpec] = match self {
            RequestShape::Basic => &[],
            RequestShape::Full => EXTENDED_FIELDS,
        };
        BASIC_FIELDS.iter().chain(extended.iter())
    }

    /// 该形态提供给特征组装的属性名（不含区域编码）
    pub fn feature_fields(self) -> Vec<&'static str> {
        self.fields()
            .map(|f| f.name)
            .filter(|name| *name != REGION_FIELD)
            .collect()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RequestShape::Basic => "basic",
            RequestShape::Full => "full",
        }
    }
}

impl fmt::Display for RequestShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 基础形态的房屋请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicProperty {
    pub bedrooms: f64,
    pub bathrooms: f64,
    pub sqft_living: i64,
    pub sqft_lot: i64,
    pub floors: f64,
    pub sqft_above: i64,
    pub sqft_basement: i64,
    pub zipcode: i64,
}

/// 完整形态的房屋请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullProperty {
    #[serde(flatten)]
    pub basic: BasicProperty,
    pub waterfront: i64,
    pub view: i64,
    pub condition: i64,
    pub grade: i64,
    pub yr_built: i64,
    pub yr_renovated: i64,
    pub lat: f64,
    pub long: f64,
    pub sqft_living15: i64,
    pub sqft_lot15: i64,
}

/// 已通过校验的房屋请求
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyInput {
    Basic(BasicProperty),
    Full(FullProperty),
}

impl PropertyInput {
    /// 按形态校验 JSON 请求体
    ///
    /// 一次性收集全部字段问题：缺失字段、非数值、整数字段给了小数。
    /// 多余字段忽略；整数值的浮点（如 `3.0`）可用于整数字段。
    pub fn parse(shape: RequestShape, body: &Value) -> Result<Self, ValidationError> {
        let object = body.as_object().ok_or_else(|| {
            ValidationError::Malformed("request body must be a JSON object".to_string())
        })?;

        let mut normalized = Map::new();
        let mut violations = Vec::new();
        for spec in shape.fields() {
            match check_field(spec, object.get(spec.name)) {
                Ok(value) => {
                    normalized.insert(spec.name.to_string(), value);
                }
                Err(violation) => violations.push(violation),
            }
        }
        if !violations.is_empty() {
            return Err(ValidationError::Fields(violations));
        }

        let normalized = Value::Object(normalized);
        let input = match shape {
            RequestShape::Basic => serde_json::from_value(normalized).map(PropertyInput::Basic),
            RequestShape::Full => serde_json::from_value(normalized).map(PropertyInput::Full),
        };
        input.map_err(|e| ValidationError::Malformed(e.to_string()))
    }

    pub fn shape(&self) -> RequestShape {
        match self {
            PropertyInput::Basic(_) => RequestShape::Basic,
            PropertyInput::Full(_) => RequestShape::Full,
        }
    }

    fn basic(&self) -> &BasicProperty {
        match self {
            PropertyInput::Basic(basic) => basic,
            PropertyInput::Full(full) => &full.basic,
        }
    }

    pub fn region_code(&self) -> RegionCode {
        RegionCode::from(self.basic().zipcode)
    }

    /// 转为特征组装使用的记录
    pub fn to_record(&self) -> Record {
        let b = self.basic();
        let mut attributes = BTreeMap::from([
            ("bedrooms".to_string(), b.bedrooms),
            ("bathrooms".to_string(), b.bathrooms),
            ("sqft_living".to_string(), b.sqft_living as f64),
            ("sqft_lot".to_string(), b.sqft_lot as f64),
            ("floors".to_string(), b.floors),
            ("sqft_above".to_string(), b.sqft_above as f64),
            ("sqft_basement".to_string(), b.sqft_basement as f64),
        ]);
        if let PropertyInput::Full(f) = self {
            attributes.extend([
                ("waterfront".to_string(), f.waterfront as f64),
                ("view".to_string(), f.view as f64),
                ("condition".to_string(), f.condition as f64),
                ("grade".to_string(), f.grade as f64),
                ("yr_built".to_string(), f.yr_built as f64),
                ("yr_renovated".to_string(), f.yr_renovated as f64),
                ("lat".to_string(), f.lat),
                ("long".to_string(), f.long),
                ("sqft_living15".to_string(), f.sqft_living15 as f64),
                ("sqft_lot15".to_string(), f.sqft_lot15 as f64),
            ]);
        }
        Record::new(self.region_code(), attributes)
    }
}

fn check_field(spec: &FieldSpec, value: Option<&Value>) -> Result<Value, FieldViolation> {
    let value = match value {
        None | Some(Value::Null) => {
            return Err(FieldViolation::new(spec.name, "field required"));
        }
        Some(value) => value,
    };

    match spec.kind {
        FieldKind::Float => value
            .as_f64()
            .filter(|_| value.is_number())
            .map(Value::from)
            .ok_or_else(|| FieldViolation::new(spec.name, "value is not a valid number")),
        FieldKind::Integer => as_integer(value)
            .map(Value::from)
            .ok_or_else(|| FieldViolation::new(spec.name, "value is not a valid integer")),
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    if let Some(i) = value.as_i64() {
        return Some(i);
    }
    let f = value.as_f64()?;
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}
