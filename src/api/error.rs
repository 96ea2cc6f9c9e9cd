use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// housing-predictor 错误类型
#[derive(Debug, Error)]
pub enum HousingError {
    #[error("Data load error: {0}")]
    DataLoad(#[from] DataLoadError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Schema mismatch: {0}")]
    SchemaMismatch(#[from] SchemaMismatchError),

    #[error("Inference error: {0}")]
    Inference(#[from] InferenceError),

    #[error("Training error: {0}")]
    Training(#[from] TrainingError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

/// 数据加载错误（启动阶段致命）
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("Failed to read {path}: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("Key column '{column}' not found in {path}")]
    MissingKeyColumn { path: String, column: String },

    #[error("Column '{column}' not found in {path}")]
    MissingColumn { path: String, column: String },

    #[error("Duplicate region code '{code}' in {path}")]
    DuplicateKey { path: String, code: String },

    #[error("Invalid value '{value}' for column '{column}' at line {line} of {path}")]
    InvalidValue {
        path: String,
        line: u64,
        column: String,
        value: String,
    },

    #[error("No data rows in {0}")]
    Empty(String),

    #[error("Failed to load model artifacts from {source_name}: {reason}")]
    Artifact { source_name: String, reason: String },
}

/// 单个字段的校验失败
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// 请求校验错误，返回给调用方（422）
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid fields: {}", describe(.0))]
    Fields(Vec<FieldViolation>),

    #[error("Malformed request body: {0}")]
    Malformed(String),

    #[error("No demographic data for zipcode {0}")]
    UnknownRegion(String),
}

impl ValidationError {
    /// 转换为响应中的 `detail` 列表
    pub fn violations(&self) -> Vec<FieldViolation> {
        match self {
            Self::Fields(violations) => violations.clone(),
            Self::Malformed(reason) => vec![FieldViolation::new("body", reason.clone())],
            Self::UnknownRegion(code) => vec![FieldViolation::new(
                "zipcode",
                format!("no demographic data for zipcode {}", code),
            )],
        }
    }
}

fn describe(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// 特征 schema 不一致
#[derive(Debug, Error)]
pub enum SchemaMismatchError {
    #[error("Columns missing from assembled record: {}", .0.join(", "))]
    MissingColumn(Vec<String>),

    #[error("Duplicate column '{0}' in feature schema")]
    DuplicateColumn(String),

    #[error("Feature schema is empty")]
    Empty,

    #[error("Request shape '{shape}' cannot supply schema columns: {}", .missing.join(", "))]
    UnsatisfiedShape { shape: String, missing: Vec<String> },

    #[error("Model was fitted on {model:?} but schema declares {schema:?}")]
    ModelDisagrees {
        model: Vec<String>,
        schema: Vec<String>,
    },

    #[error("Invalid feature schema file: {0}")]
    Invalid(String),
}

/// 推理错误
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model expects {expected} features, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Non-finite value in {0}")]
    NonFinite(String),

    #[error("Inference failed: {0}")]
    Failed(String),
}

/// 训练错误
#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("Not enough samples: need at least {required}, have {available}")]
    InsufficientSamples { required: usize, available: usize },

    #[error("Feature matrix has {rows} rows but {targets} targets")]
    LengthMismatch { rows: usize, targets: usize },

    #[error("Invalid training parameter: {0}")]
    InvalidParameter(String),
}

/// 存储错误
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Artifact not found: {0}")]
    NotFound(String),

    #[error("Failed to read artifact: {0}")]
    ReadFailed(String),

    #[error("Failed to write artifact: {0}")]
    WriteFailed(String),

    #[error("Invalid artifact file: {0}")]
    InvalidFile(String),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    LoadFailed(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// API 错误
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request shape not enabled: {0}")]
    ShapeDisabled(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, HousingError>;

/// 错误响应体
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: Vec<FieldViolation>,
}

impl HousingError {
    /// 对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Api(ApiError::ShapeDisabled(_)) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> Vec<FieldViolation> {
        match self {
            Self::Validation(err) => err.violations(),
            Self::SchemaMismatch(SchemaMismatchError::MissingColumn(columns)) => columns
                .iter()
                .map(|c| FieldViolation::new(c.clone(), "missing from assembled features"))
                .collect(),
            other => vec![FieldViolation::new("server", other.to_string())],
        }
    }
}

impl IntoResponse for HousingError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }
        (status, Json(ErrorResponse { detail: self.detail() })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_422() {
        let err: HousingError = ValidationError::Fields(vec![FieldViolation::new(
            "bedrooms",
            "field required",
        )])
        .into();
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.detail().len(), 1);
    }

    #[test]
    fn test_schema_mismatch_is_server_error() {
        let err: HousingError =
            SchemaMismatchError::MissingColumn(vec!["grade".to_string(), "view".to_string()])
                .into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let detail = err.detail();
        assert_eq!(detail.len(), 2);
        assert_eq!(detail[0].field, "grade");
    }

    #[test]
    fn test_unknown_region_detail_names_zipcode() {
        let err = ValidationError::UnknownRegion("99999".to_string());
        let detail = err.violations();
        assert_eq!(detail[0].field, "zipcode");
        assert!(detail[0].message.contains("99999"));
    }
}
