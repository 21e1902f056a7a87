/// Error handling for the API server
///
/// Handlers return `ApiResult<T>`. Library errors convert into [`ApiError`]
/// with `?`, and `ApiError` renders as a JSON body:
///
/// ```json
/// { "error": "ambiguous_match", "message": "...", "candidates": ["'Buy milk' (ID: ...)"] }
/// ```
///
/// # Example
///
/// ```
/// use taskpad_api::error::{ApiError, ApiResult};
/// use axum::Json;
/// use serde_json::{json, Value};
///
/// async fn handler(name: Option<String>) -> ApiResult<Json<Value>> {
///     let name = name.ok_or_else(|| ApiError::BadRequest("name is required".into()))?;
///     Ok(Json(json!({ "hello": name })))
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use taskpad_shared::auth::{jwt::JwtError, password::PasswordError};
use taskpad_shared::store::StoreError;
use taskpad_shared::tasks::TaskError;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// 400
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 400, carrying the field that failed
    #[error("Validation failed: {0}")]
    Validation(String),

    /// 400 with candidate labels
    #[error("Ambiguous match: {message}")]
    AmbiguousMatch {
        message: String,
        candidates: Vec<String>,
    },

    /// 401
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 403
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// 404
    #[error("Not found: {0}")]
    NotFound(String),

    /// 409, e.g. duplicate email
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 422, request body failed field validation
    #[error("Validation failed: {} errors", .0.len())]
    InvalidFields(Vec<ValidationErrorDetail>),

    /// 500; the detail is logged, never returned
    #[error("Internal error: {0}")]
    InternalError(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    pub field: String,
    pub message: String,
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable kind, e.g. "not_found"
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidates: Option<Vec<String>>,
}

impl ErrorResponse {
    fn new(error: &str, message: String) -> Self {
        Self {
            error: error.to_string(),
            message,
            details: None,
            candidates: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::new("bad_request", msg)),
            ApiError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("validation_error", msg),
            ),
            ApiError::AmbiguousMatch {
                message,
                candidates,
            } => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    candidates: Some(candidates),
                    ..ErrorResponse::new("ambiguous_match", message)
                },
            ),
            ApiError::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse::new("unauthorized", msg),
            ),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, ErrorResponse::new("forbidden", msg)),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorResponse::new("not_found", msg)),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, ErrorResponse::new("conflict", msg)),
            ApiError::InvalidFields(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse {
                    details: Some(errors),
                    ..ErrorResponse::new("validation_error", "Request validation failed".to_string())
                },
            ),
            ApiError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("internal_error", "An internal error occurred".to_string()),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<TaskError> for ApiError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::Validation(msg) => ApiError::Validation(msg),
            TaskError::InvalidIdentifier(msg) => ApiError::BadRequest(msg),
            TaskError::NotFound(msg) => ApiError::NotFound(msg),
            TaskError::Ambiguous {
                message,
                candidates,
            } => ApiError::AmbiguousMatch {
                message,
                candidates: candidates.iter().map(|c| c.label()).collect(),
            },
            TaskError::Forbidden(msg) => ApiError::Forbidden(msg),
            TaskError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(constraint) if constraint.contains("email") => {
                ApiError::Conflict("Email already exists".to_string())
            }
            StoreError::Conflict(constraint) => {
                ApiError::Conflict(format!("Constraint violation: {}", constraint))
            }
            other => ApiError::InternalError(format!("Storage error: {}", other)),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| ValidationErrorDetail {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid {}", field)),
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));
        ApiError::InvalidFields(details)
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            JwtError::CreateError(msg) => ApiError::InternalError(msg),
            other => ApiError::Unauthorized(format!("Invalid token: {}", other)),
        }
    }
}
