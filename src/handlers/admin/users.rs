use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use serde::Deserialize;
use tracing::error;

use crate::api::{self, BaseUrl, PageQuery};
use crate::auth::hash_password;
use crate::database::models::{User, UserInput, UserResponse};
use crate::error::ApiError;
use crate::handlers::{json_body, parse_id, Required};
use crate::middleware::{ApiResponse, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct UserRequest {
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role_ids: Option<Vec<i64>>,
}

async fn hash(password: String) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| {
            error!("Password hashing task failed: {}", e);
            ApiError::internal_server_error("Something went wrong")
        })?
        .map_err(|e| {
            error!("{}", e);
            ApiError::internal_server_error("Something went wrong")
        })
}

/// Validated fields. On create the password and role ids are required; on
/// update a blank password keeps the current hash.
async fn input(body: UserRequest, creating: bool) -> Result<UserInput, ApiError> {
    let mut required = Required::new();
    let name = required.text("name", body.name.as_deref());
    let username = required.text("username", body.username.as_deref());
    let email = required.text("email", body.email.as_deref());

    let password = body.password.filter(|p| !p.is_empty());
    if creating && password.is_none() {
        required.missing("password");
    }
    if creating && body.role_ids.is_none() {
        required.missing("role_ids");
    }
    required.finish()?;

    let password_hash = match password {
        Some(plain) => Some(hash(plain).await?),
        None => None,
    };

    Ok(UserInput {
        name,
        username,
        email,
        password_hash,
        role_ids: body.role_ids.unwrap_or_default(),
    })
}

/// GET /api/admin/users
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
    base: BaseUrl,
) -> ApiResult<api::Page<UserResponse>> {
    let params = state.page_params(&query);
    let (rows, total) = state.repo::<User>(User::TABLE)?.paginate("name", &params).await?;
    let data = User::with_roles(&state.pool, rows).await?;

    Ok(ApiResponse::success("List Data Users", api::Page::new(data, total, &params, &base)))
}

/// POST /api/admin/users
pub async fn store(
    State(state): State<AppState>,
    payload: Result<Json<UserRequest>, JsonRejection>,
) -> ApiResult<UserResponse> {
    let input = input(json_body(payload)?, true).await?;
    let user = User::insert(&state.pool, &input).await?;
    let response = single(&state, user).await?;
    Ok(ApiResponse::created("Success create user", response))
}

/// GET /api/admin/users/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<UserResponse> {
    let id = parse_id(&id)?;
    let user = state.repo::<User>(User::TABLE)?.find_or(id, "User not found").await?;
    Ok(ApiResponse::success("User found", single(&state, user).await?))
}

/// PUT /api/admin/users/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UserRequest>, JsonRejection>,
) -> ApiResult<UserResponse> {
    let id = parse_id(&id)?;
    let input = input(json_body(payload)?, false).await?;
    let user = User::update(&state.pool, id, &input).await?;
    Ok(ApiResponse::success("Success update user", single(&state, user).await?))
}

/// DELETE /api/admin/users/:id
pub async fn destroy(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let id = parse_id(&id)?;
    User::delete(&state.pool, id).await?;
    Ok(ApiResponse::message_only("Success delete user"))
}

async fn single(state: &AppState, user: User) -> Result<UserResponse, ApiError> {
    let mut responses = User::with_roles(&state.pool, vec![user]).await?;
    responses
        .pop()
        .ok_or_else(|| ApiError::internal_server_error("Failed to load user roles"))
}
