use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use tracing::{error, info, warn};

use crate::auth::{hash_password, verify_password};
use crate::error::ApiError;
use crate::handlers::{json_body, Required};
use crate::middleware::{ApiResponse, ApiResult};
use crate::AppState;

/// Same message for an unknown user and a wrong password
const LOGIN_FAILED: &str = "Username or Password is Wrong";

static UNKNOWN_USER_HASH: Lazy<String> = Lazy::new(|| hash_password("desa-digital-unknown-user").unwrap_or_default());

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub email: String,
    pub permissions: BTreeMap<String, bool>,
    pub token: String,
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let body = json_body(payload)?;

    let mut required = Required::new();
    let username = required.text("username", body.username.as_deref());
    let password = body.password.unwrap_or_default();
    if password.is_empty() {
        required.missing("password");
    }
    required.finish()?;

    let principal = state.principals.find_principal(&username).await?;

    // Unknown users still run one verification, against a throwaway hash
    let stored_hash = principal.as_ref().map(|p| p.password_hash.clone());
    let outcome = tokio::task::spawn_blocking(move || {
        let hash = stored_hash.unwrap_or_else(|| UNKNOWN_USER_HASH.clone());
        verify_password(&password, &hash)
    })
        .await
        .map_err(|e| {
            error!("Password verification task failed: {}", e);
            ApiError::internal_server_error("Failed to verify credentials")
        })?;

    let Some(principal) = principal else {
        warn!("Login rejected for {}: unknown user", username);
        return Err(ApiError::unauthorized(LOGIN_FAILED));
    };

    let matches = outcome.map_err(|e| {
        error!("Stored hash for {} is unusable: {}", username, e);
        ApiError::internal_server_error("Failed to verify credentials")
    })?;

    if !matches {
        warn!("Login rejected for {}: password mismatch", username);
        return Err(ApiError::unauthorized(LOGIN_FAILED));
    }

    let issued = state.tokens.issue(&principal.username).map_err(|e| {
        error!("Failed to issue token for {}: {}", username, e);
        ApiError::internal_server_error("Failed to generate token")
    })?;

    info!("User {} logged in, token valid until {}", principal.username, issued.expires_at);

    let permissions = principal.permission_set().to_map();
    Ok(ApiResponse::success(
        "Login Success",
        LoginResponse {
            id: principal.id,
            name: principal.name,
            username: principal.username,
            email: principal.email,
            permissions,
            token: issued.token,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_user_hash_is_a_real_argon2_hash() {
        assert!(UNKNOWN_USER_HASH.starts_with("$argon2"));
        assert!(!verify_password("", &UNKNOWN_USER_HASH).unwrap());
        assert!(!verify_password("rahasia", &UNKNOWN_USER_HASH).unwrap());
    }
}
