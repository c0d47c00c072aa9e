//! Error types for taskdeckd

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use taskdeck_engine::{LogStoreError, RunError};
use taskdeck_types::ConfigValidationError;
use thiserror::Error;

/// Daemon-level errors
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Server startup error
    #[error("Server error: {0}")]
    Server(String),

    /// Run configuration could not be loaded
    #[error("Run configuration error: {0}")]
    RunConfig(#[from] RunConfigError),

    /// Startup roster could not be read
    #[error("Roster error: {0}")]
    Roster(#[from] RosterImportError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Run configuration file errors
#[derive(Debug, Error)]
pub enum RunConfigError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Invalid(#[from] ConfigValidationError),
}

/// Roster spreadsheet errors
#[derive(Debug, Error)]
pub enum RosterImportError {
    #[error("Unreadable workbook: {0}")]
    Workbook(String),

    #[error("Workbook has no sheets")]
    NoSheets,

    #[error("Missing column: {0}")]
    MissingColumn(&'static str),
}

/// Task log export errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Workbook error: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),

    #[error("Too many log entries for one sheet: {0}")]
    TooManyRows(usize),
}

/// API-specific errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Run request rejected
    #[error(transparent)]
    Run(#[from] RunError),

    /// Task log unavailable
    #[error(transparent)]
    Log(#[from] LogStoreError),

    /// Run configuration rejected or not persisted
    #[error(transparent)]
    RunConfig(#[from] RunConfigError),

    /// Uploaded roster rejected
    #[error(transparent)]
    RosterImport(#[from] RosterImportError),

    /// Spreadsheet export failed
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Run(e) => match e {
                RunError::AlreadyRunning => (StatusCode::CONFLICT, "ALREADY_RUNNING"),
                RunError::UnknownTask(_) => (StatusCode::BAD_REQUEST, "UNKNOWN_TASK"),
                RunError::MissingInput(_) => (StatusCode::BAD_REQUEST, "MISSING_INPUT"),
                RunError::NoAccounts => (StatusCode::BAD_REQUEST, "NO_ACCOUNTS"),
                RunError::InsufficientAccounts(_) => {
                    (StatusCode::BAD_REQUEST, "INSUFFICIENT_ACCOUNTS")
                }
                RunError::InvalidParameter(_) => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_PARAMETER")
                }
            },
            ApiError::Log(_) => (StatusCode::INTERNAL_SERVER_ERROR, "LOG_STORE_ERROR"),
            ApiError::RunConfig(RunConfigError::Invalid(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR")
            }
            ApiError::RunConfig(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
            ApiError::RosterImport(_) => (StatusCode::BAD_REQUEST, "INVALID_ROSTER"),
            ApiError::Export(_) => (StatusCode::INTERNAL_SERVER_ERROR, "EXPORT_ERROR"),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ApiError::Run(RunError::UnknownTask(task) | RunError::MissingInput(task)) => {
                Some(serde_json::json!({ "task": task }))
            }
            ApiError::Run(RunError::InsufficientAccounts(eligible)) => {
                Some(serde_json::json!({ "eligible": eligible, "required": 2 }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        if status.is_server_error() {
            tracing::error!(code, error = %self, "Request failed");
        }

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
            details: self.details(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type alias for daemon operations
pub type DaemonResult<T> = Result<T, DaemonError>;
