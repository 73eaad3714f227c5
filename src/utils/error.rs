use axum::http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Invalid parameter '{field}' = '{value}': {reason}")]
    InvalidParameter {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Background task failed: {0}")]
    TaskError(#[from] tokio::task::JoinError),

    #[error("Query error: {message}")]
    QueryError { message: String },

    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    #[error("Dataset error: {message}")]
    DatasetError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

/// 錯誤分類：客戶端參數錯誤、查詢/外部依賴錯誤、啟動配置錯誤
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidParameter,
    InternalQuery,
    Configuration,
}

impl DashboardError {
    pub fn invalid_parameter(field: &str, value: &str, reason: impl Into<String>) -> Self {
        DashboardError::InvalidParameter {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DashboardError::InvalidParameter { .. } => ErrorKind::InvalidParameter,
            DashboardError::ConfigError { .. }
            | DashboardError::MissingConfigError { .. }
            | DashboardError::InvalidConfigValueError { .. } => ErrorKind::Configuration,
            _ => ErrorKind::InternalQuery,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::InvalidParameter => StatusCode::BAD_REQUEST,
            ErrorKind::InternalQuery | ErrorKind::Configuration => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameter_is_client_error() {
        let err = DashboardError::invalid_parameter("month", "13", "Value must be between 1 and 12");
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("month"));
    }

    #[test]
    fn test_query_failures_are_server_errors() {
        let err = DashboardError::QueryError {
            message: "connection lost".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::InternalQuery);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let err = DashboardError::Timeout {
            operation: "statistics".to_string(),
            timeout_ms: 50,
        };
        assert_eq!(err.kind(), ErrorKind::InternalQuery);
    }

    #[test]
    fn test_config_errors_are_classified() {
        let err = DashboardError::MissingConfigError {
            field: "port".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
