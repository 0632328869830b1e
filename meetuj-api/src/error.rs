/// HTTP error type
///
/// Handlers return `ApiResult<T>`; domain errors from the service layer
/// convert with `?` and become JSON bodies of the form
/// `{"error": "<code>", "message": "...", "details": [...]}`.
///
/// # Example
///
/// ```
/// use meetuj_api::error::{ApiError, ApiResult};
/// use axum::Json;
/// use serde_json::{json, Value};
///
/// async fn handler(found: bool) -> ApiResult<Json<Value>> {
///     if !found {
///         return Err(ApiError::NotFound("Meeting not found".to_string()));
///     }
///     Ok(Json(json!({ "ok": true })))
/// }
/// ```

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use meetuj_shared::auth::credentials::CredentialError;
use meetuj_shared::auth::middleware::UNAUTHORIZED_MESSAGE;
use meetuj_shared::error::ServiceError;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::storage::StorageError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    /// 400, a business rule on the input was violated
    BadRequest(String),

    /// 401, always with the same generic message
    Unauthorized,

    /// 404
    NotFound(String),

    /// 409, duplicate or ownership conflict
    Conflict(String),

    /// 409, the meeting overlaps another one
    ScheduleConflict(String),

    /// 422, request shape failed validation
    ValidationError(Vec<ValidationErrorDetail>),

    /// 500; the message is logged, never returned
    InternalError(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    pub field: String,
    pub message: String,
}

/// JSON error body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,

    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl ApiError {
    /// Stable error code used in response bodies
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "invalid_input",
            ApiError::Unauthorized => "unauthorized",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::ScheduleConflict(_) => "schedule_conflict",
            ApiError::ValidationError(_) => "validation_error",
            ApiError::InternalError(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) | ApiError::ScheduleConflict(_) => StatusCode::CONFLICT,
            ApiError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to clients
    pub fn public_message(&self) -> String {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::ScheduleConflict(msg) => msg.clone(),
            ApiError::Unauthorized => UNAUTHORIZED_MESSAGE.to_string(),
            ApiError::ValidationError(_) => "Request validation failed".to_string(),
            ApiError::InternalError(_) => "An internal error occurred".to_string(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized => write!(f, "Unauthorized"),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ScheduleConflict(msg) => write!(f, "Schedule conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::InternalError(msg) = &self {
            tracing::error!(error = %msg, "Internal error");
        }

        let status = self.status();
        let body = ErrorResponse {
            error: self.code().to_string(),
            message: self.public_message(),
            details: match self {
                ApiError::ValidationError(details) => Some(details),
                _ => None,
            },
        };

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        tracing::debug!(kind = err.kind(), "Credential rejected");
        ApiError::Unauthorized
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidCredential(cause) => cause.into(),
            ServiceError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            ServiceError::Conflict(msg) => ApiError::Conflict(msg),
            ServiceError::ScheduleConflict(conflict) => {
                ApiError::ScheduleConflict(conflict.to_string())
            }
            ServiceError::InvalidInput(msg) => ApiError::BadRequest(msg),
            ServiceError::Password(_) | ServiceError::Database(_) | ServiceError::Internal(_) => {
                ApiError::InternalError(err.to_string())
            }
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Empty | StorageError::TooLarge => ApiError::BadRequest(err.to_string()),
            StorageError::NotFound => ApiError::NotFound(err.to_string()),
            StorageError::Io(_) => ApiError::InternalError(err.to_string()),
        }
    }
}

/// Flattens `validator` field errors into response details
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value ({})", error.code)),
                })
            })
            .collect();

        details.sort_by(|a, b| a.field.cmp(&b.field));
        ApiError::ValidationError(details)
    }
}
