//! HTTP handlers grouped by audience: `auth` (login), `admin` (bearer token
//! plus one permission per route) and `public` (no authentication).

pub mod admin;
pub mod auth;
pub mod public;

use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde::de::DeserializeOwned;

use crate::database::models::User;
use crate::error::{ApiError, FieldErrors};
use crate::middleware::AuthUser;
use crate::AppState;

/// Parse a numeric path id; anything else is a 400
pub fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| {
            let mut errors = FieldErrors::new();
            errors.insert("id".into(), "id must be a positive integer".into());
            ApiError::bad_request_with("Invalid id", errors)
        })
}

/// Unwrap a JSON body, turning malformed input into a 400
pub fn json_body<T: DeserializeOwned>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| ApiError::bad_request(format!("Invalid request body: {}", e.body_text())))
}

/// Accumulates `"<field> is required"` errors for blank or missing inputs
#[derive(Debug, Default)]
pub struct Required {
    errors: FieldErrors,
}

impl Required {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trimmed value of a required text input, or empty after recording
    /// the error
    pub fn text(&mut self, field: &str, value: Option<&str>) -> String {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => v.to_string(),
            None => {
                self.missing(field);
                String::new()
            }
        }
    }

    /// Required integer input; absent or unparsable values are recorded
    pub fn integer(&mut self, field: &str, value: Option<&str>) -> i64 {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => v.parse::<i64>().unwrap_or_else(|_| {
                self.errors.insert(field.to_string(), format!("{} must be a number", field));
                0
            }),
            None => {
                self.missing(field);
                0
            }
        }
    }

    pub fn missing(&mut self, field: &str) {
        self.errors.insert(field.to_string(), format!("{} is required", field));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// 422 with every recorded field, or Ok when none are missing
    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation("Validation Errors", self.errors))
        }
    }
}

/// Load the users row behind the authenticated principal
pub async fn current_user(state: &AppState, auth: &AuthUser) -> Result<User, ApiError> {
    User::find_by_username(&state.pool, &auth.username)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn parses_positive_ids_only() {
        assert_eq!(parse_id("42").unwrap(), 42);
        for raw in ["abc", "0", "-1", "", "4.2"] {
            assert_eq!(parse_id(raw).unwrap_err().status_code(), StatusCode::BAD_REQUEST, "{raw}");
        }
    }

    #[test]
    fn collects_every_missing_field() {
        let mut required = Required::new();
        assert_eq!(required.text("title", Some("  Kabar Desa ")), "Kabar Desa");
        required.text("content", Some("   "));
        required.text("image", None);

        let err = required.finish().unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        let errors = err.field_errors().unwrap();
        assert_eq!(errors["content"], "content is required");
        assert_eq!(errors["image"], "image is required");
        assert!(!errors.contains_key("title"));
    }

    #[test]
    fn rejects_non_numeric_integers() {
        let mut required = Required::new();
        assert_eq!(required.integer("price", Some("15000")), 15000);
        required.integer("category_id", Some("satu"));

        let err = required.finish().unwrap_err();
        assert_eq!(err.field_errors().unwrap()["category_id"], "category_id must be a number");
    }
}
