use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::api::{self, BaseUrl, PageQuery};
use crate::database::models::{Permission, PermissionResponse};
use crate::error::ApiError;
use crate::handlers::{json_body, parse_id, Required};
use crate::middleware::{ApiResponse, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PermissionRequest {
    pub name: Option<String>,
}

fn name(body: PermissionRequest) -> Result<String, ApiError> {
    let mut required = Required::new();
    let name = required.text("name", body.name.as_deref());
    required.finish()?;
    Ok(name)
}

/// GET /api/admin/permissions
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
    base: BaseUrl,
) -> ApiResult<api::Page<PermissionResponse>> {
    let params = state.page_params(&query);
    let (rows, total) = state
        .repo::<Permission>(Permission::TABLE)?
        .paginate("name", &params)
        .await?;
    let data = rows.into_iter().map(PermissionResponse::from).collect();

    Ok(ApiResponse::success("List Data Permissions", api::Page::new(data, total, &params, &base)))
}

/// GET /api/admin/permissions/all
pub async fn all(State(state): State<AppState>) -> ApiResult<Vec<PermissionResponse>> {
    let rows = state.repo::<Permission>(Permission::TABLE)?.all().await?;
    Ok(ApiResponse::success(
        "Lists Data Permissions",
        rows.into_iter().map(PermissionResponse::from).collect(),
    ))
}

/// POST /api/admin/permissions
pub async fn store(
    State(state): State<AppState>,
    payload: Result<Json<PermissionRequest>, JsonRejection>,
) -> ApiResult<PermissionResponse> {
    let name = name(json_body(payload)?)?;
    let permission = Permission::insert(&state.pool, &name).await?;
    Ok(ApiResponse::created("Success create permission", permission.into()))
}

/// GET /api/admin/permissions/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<PermissionResponse> {
    let id = parse_id(&id)?;
    let permission = state
        .repo::<Permission>(Permission::TABLE)?
        .find_or(id, "Permission not found")
        .await?;
    Ok(ApiResponse::success("Permission found", permission.into()))
}

/// PUT /api/admin/permissions/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<PermissionRequest>, JsonRejection>,
) -> ApiResult<PermissionResponse> {
    let id = parse_id(&id)?;
    let name = name(json_body(payload)?)?;
    let permission = Permission::update(&state.pool, id, &name).await?;
    Ok(ApiResponse::success("Success update permission", permission.into()))
}

/// DELETE /api/admin/permissions/:id
pub async fn destroy(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let id = parse_id(&id)?;
    Permission::delete(&state.pool, id).await?;
    Ok(ApiResponse::message_only("Success delete permission"))
}
