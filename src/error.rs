// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::api::upload::UploadError;
use crate::database::DatabaseError;

/// Field name -> human readable message
pub type FieldErrors = BTreeMap<String, String>;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest { message: String, field_errors: Option<FieldErrors> },

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict { message: String, field_errors: FieldErrors },

    // 422 Unprocessable Entity
    Validation { message: String, field_errors: FieldErrors },

    // 500, but the primary mutation already happened
    PartialFailure { message: String, field_errors: FieldErrors },

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::PartialFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest { message, .. } => message,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict { message, .. } => message,
            ApiError::Validation { message, .. } => message,
            ApiError::PartialFailure { message, .. } => message,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest { .. } => "BAD_REQUEST",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict { .. } => "CONFLICT",
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::PartialFailure { .. } => "PARTIAL_FAILURE",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ApiError::BadRequest { field_errors, .. } => field_errors.as_ref(),
            ApiError::Conflict { field_errors, .. }
            | ApiError::Validation { field_errors, .. }
            | ApiError::PartialFailure { field_errors, .. } => Some(field_errors),
            _ => None,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "success": false,
            "message": self.message(),
            "code": self.error_code(),
        });

        if let Some(field_errors) = self.field_errors() {
            body["errors"] = json!(field_errors);
        }

        body
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest { message: message.into(), field_errors: None }
    }

    pub fn bad_request_with(message: impl Into<String>, field_errors: FieldErrors) -> Self {
        ApiError::BadRequest { message: message.into(), field_errors: Some(field_errors) }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn validation(message: impl Into<String>, field_errors: FieldErrors) -> Self {
        ApiError::Validation { message: message.into(), field_errors }
    }

    /// Single-field validation failure
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut field_errors = FieldErrors::new();
        field_errors.insert(field.to_string(), message.into());
        ApiError::validation("Validation Errors", field_errors)
    }

    pub fn partial_failure(message: impl Into<String>, field_errors: FieldErrors) -> Self {
        ApiError::PartialFailure { message: message.into(), field_errors }
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match &err {
            DatabaseError::NotFound(msg) => ApiError::not_found(msg.clone()),
            DatabaseError::UniqueViolation { .. } => {
                let mut field_errors = FieldErrors::new();
                match err.violated_field() {
                    Some(field) => {
                        field_errors.insert(field.clone(), format!("{} already exists", field));
                    }
                    None => {
                        field_errors.insert("error".to_string(), "Duplicate entry".to_string());
                    }
                }
                ApiError::Conflict { message: "Duplicate entry".to_string(), field_errors }
            }
            DatabaseError::ForeignKeyViolation { constraint } => {
                tracing::warn!("Foreign key violation: {:?}", constraint);
                let mut field_errors = FieldErrors::new();
                field_errors.insert("error".to_string(), "Related record is missing or still in use".to_string());
                ApiError::Conflict { message: "Related record conflict".to_string(), field_errors }
            }
            DatabaseError::InvalidIdentifier(name) => {
                tracing::error!("Rejected SQL identifier: {}", name);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
            DatabaseError::Migration(e) => {
                tracing::error!("Migration error: {}", e);
                ApiError::service_unavailable("Service is being updated, please try again later")
            }
            DatabaseError::Sqlx(sqlx_err) => {
                // Log the real error but return generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error("Database error occurred")
            }
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        let field_errors = err.field_errors();
        match err {
            UploadError::Io(ref e) => {
                tracing::error!("Upload I/O failure: {}", e);
                ApiError::InternalServerError(err.to_string())
            }
            _ => ApiError::bad_request_with(err.to_string(), field_errors),
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_maps_to_conflict_with_field() {
        let err: ApiError = DatabaseError::UniqueViolation {
            constraint: Some("users_email_key".to_string()),
        }
        .into();

        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        let body = err.to_json();
        assert_eq!(body["errors"]["email"], "email already exists");
        assert_eq!(body["success"], false);
    }

    #[test]
    fn not_found_has_no_errors_map() {
        let err: ApiError = DatabaseError::NotFound("Record not found".into()).into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert!(err.to_json().get("errors").is_none());
    }

    #[test]
    fn field_helper_builds_validation_error() {
        let err = ApiError::field("title", "title is required");
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.to_json()["errors"]["title"], "title is required");
    }
}
