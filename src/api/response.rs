//! Response types for the payroll cost engine API.
//!
//! This module defines the error response structures, the engine error to
//! HTTP status mapping and the active parameters summary.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::ParameterVersion;
use crate::error::EngineError;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        match error {
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::InvalidParameters { .. } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
            },
            EngineError::NoActiveParameterVersion => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "NO_ACTIVE_PARAMETERS",
                    message,
                    "Pin a version with params_version_id or activate one",
                ),
            },
            EngineError::ParameterVersionNotFound { id } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "PARAMETER_VERSION_NOT_FOUND",
                    message,
                    format!("The parameter version '{}' is not loaded by this engine", id),
                ),
            },
            EngineError::UnknownAfpProvider { name } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "UNKNOWN_AFP_PROVIDER",
                    message,
                    format!("The parameter version has no commission for AFP '{}'", name),
                ),
            },
            EngineError::ReferenceNotFound { .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "REFERENCE_NOT_FOUND",
                    message,
                    "Supply the value explicitly or request a date covered by the reference series",
                ),
            },
            EngineError::InvalidInput { .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::validation_error(message),
            },
        }
    }
}

/// Summary of the active parameter version for `GET /parameters/active`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveParametersResponse {
    /// Version id.
    pub version_id: String,
    /// Human-readable version name.
    pub version_name: String,
    /// Where the values were taken from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// First day the version applies.
    pub effective_from: NaiveDate,
    /// Last day the version applies, if superseded.
    pub effective_until: Option<NaiveDate>,
    /// AFPs with a commission in this version, sorted.
    pub afp_providers: Vec<String>,
}

impl From<&ParameterVersion> for ActiveParametersResponse {
    fn from(version: &ParameterVersion) -> Self {
        Self {
            version_id: version.id.clone(),
            version_name: version.data.version_metadata.name.clone(),
            source: version.data.version_metadata.source.clone(),
            effective_from: version.effective_from,
            effective_until: version.effective_until,
            afp_providers: version.data.afp.commissions.keys().cloned().collect(),
        }
    }
}
