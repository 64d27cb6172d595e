use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::api::{self, BaseUrl, PageQuery};
use crate::database::models::{Role, RoleResponse};
use crate::error::ApiError;
use crate::handlers::{json_body, parse_id, Required};
use crate::middleware::{ApiResponse, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub name: Option<String>,
    #[serde(default)]
    pub permission_ids: Vec<i64>,
}

fn name(body: &RoleRequest) -> Result<String, ApiError> {
    let mut required = Required::new();
    let name = required.text("name", body.name.as_deref());
    required.finish()?;
    Ok(name)
}

/// GET /api/admin/roles
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
    base: BaseUrl,
) -> ApiResult<api::Page<RoleResponse>> {
    let params = state.page_params(&query);
    let (rows, total) = state.repo::<Role>(Role::TABLE)?.paginate("name", &params).await?;
    let data = Role::with_permissions(&state.pool, rows).await?;

    Ok(ApiResponse::success("List Data Roles", api::Page::new(data, total, &params, &base)))
}

/// GET /api/admin/roles/all
pub async fn all(State(state): State<AppState>) -> ApiResult<Vec<RoleResponse>> {
    let rows = state.repo::<Role>(Role::TABLE)?.all().await?;
    let data = Role::with_permissions(&state.pool, rows).await?;
    Ok(ApiResponse::success("Lists Data Roles", data))
}

/// POST /api/admin/roles
pub async fn store(
    State(state): State<AppState>,
    payload: Result<Json<RoleRequest>, JsonRejection>,
) -> ApiResult<RoleResponse> {
    let body = json_body(payload)?;
    let name = name(&body)?;
    let role = Role::insert(&state.pool, &name, &body.permission_ids).await?;
    Ok(ApiResponse::created("Success create role", single(&state, role).await?))
}

/// GET /api/admin/roles/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<RoleResponse> {
    let id = parse_id(&id)?;
    let role = state.repo::<Role>(Role::TABLE)?.find_or(id, "Role not found").await?;
    Ok(ApiResponse::success("Role found", single(&state, role).await?))
}

/// PUT /api/admin/roles/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<RoleRequest>, JsonRejection>,
) -> ApiResult<RoleResponse> {
    let id = parse_id(&id)?;
    let body = json_body(payload)?;
    let name = name(&body)?;
    let role = Role::update(&state.pool, id, &name, &body.permission_ids).await?;
    Ok(ApiResponse::success("Success update role", single(&state, role).await?))
}

/// DELETE /api/admin/roles/:id
pub async fn destroy(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let id = parse_id(&id)?;
    Role::delete(&state.pool, id).await?;
    Ok(ApiResponse::message_only("Success delete role"))
}

async fn single(state: &AppState, role: Role) -> Result<RoleResponse, ApiError> {
    let mut responses = Role::with_permissions(&state.pool, vec![role]).await?;
    responses
        .pop()
        .ok_or_else(|| ApiError::internal_server_error("Failed to load role permissions"))
}
