/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// All handlers should return `Result<T, ApiError>` which automatically
/// converts to appropriate HTTP status codes.
///
/// The error body follows the service's envelope convention: client errors
/// (4xx) render `{"status": "fail", "message": ...}`, server errors (5xx)
/// render `{"status": "error", "message": ...}`.
///
/// # Example
///
/// ```ignore
/// use cotodo_api::error::{ApiError, ApiResult};
/// use axum::Json;
/// use serde_json::json;
///
/// async fn handler() -> ApiResult<Json<serde_json::Value>> {
///     let data = fetch_data().await?;
///     Ok(Json(json!({ "data": data })))
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cotodo_shared::{
    auth::{jwt::JwtError, password::PasswordError},
    models::user::MentionError,
};
use serde_json::json;
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409) - e.g., duplicate tag name
    Conflict(String),

    /// Internal server error (500)
    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong".to_string(),
                )
            }
        };

        // 4xx is the client's fault ("fail"), 5xx is ours ("error")
        let envelope = if status.is_client_error() {
            "fail"
        } else {
            "error"
        };

        let body = Json(json!({
            "status": envelope,
            "message": message,
        }));

        (status, body).into_response()
    }
}

/// Convert sqlx errors to API errors
///
/// Unique-constraint violations on user identity columns map to 400 so the
/// signup flow reports "already in use" the way the rest of the validation
/// does; a duplicate tag name is a 409 because the tag already exists as a
/// resource.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                if let Some(constraint) = db_err.constraint() {
                    if constraint.contains("users_email") {
                        return ApiError::BadRequest("Email already in use".to_string());
                    }
                    if constraint.contains("users_username") {
                        return ApiError::BadRequest("Username already in use".to_string());
                    }
                    if constraint.contains("tags_name") {
                        return ApiError::Conflict("Tag name already exists".to_string());
                    }
                    if constraint.ends_with("_fkey") {
                        return ApiError::BadRequest("Referenced resource does not exist".to_string());
                    }
                    return ApiError::Conflict(format!("Constraint violation: {}", constraint));
                }

                ApiError::InternalError(format!("Database error: {}", db_err))
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert JWT errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            JwtError::InvalidIssuer { .. } => {
                ApiError::Unauthorized("Invalid token issuer".to_string())
            }
            _ => ApiError::Unauthorized(format!("Invalid token: {}", err)),
        }
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

/// Convert mention resolution errors to API errors
///
/// An unresolvable mention is an access grant that cannot be honored, so the
/// whole request is rejected instead of silently dropping the grant.
impl From<MentionError> for ApiError {
    fn from(err: MentionError) -> Self {
        match err {
            MentionError::Unresolved(raw) => {
                ApiError::BadRequest(format!("Unknown user reference: {}", raw))
            }
            MentionError::Database(err) => err.into(),
        }
    }
}

/// Convert validator errors to a single 400 listing each failed field
pub fn validation_error(errors: &validator::ValidationErrors) -> ApiError {
    let mut parts: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "is invalid".to_string());
                format!("{}: {}", field, message)
            })
        })
        .collect();
    parts.sort();

    ApiError::BadRequest(parts.join("; "))
}
