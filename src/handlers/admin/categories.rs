use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::api::{self, slugify, BaseUrl, PageQuery};
use crate::database::models::{Category, CategoryInput, CategoryResponse};
use crate::error::ApiError;
use crate::handlers::{json_body, parse_id, Required};
use crate::middleware::{ApiResponse, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub name: Option<String>,
}

fn input(body: CategoryRequest) -> Result<CategoryInput, ApiError> {
    let mut required = Required::new();
    let name = required.text("name", body.name.as_deref());
    required.finish()?;

    let slug = slugify(&name);
    Ok(CategoryInput { name, slug })
}

/// GET /api/admin/categories
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
    base: BaseUrl,
) -> ApiResult<api::Page<CategoryResponse>> {
    let params = state.page_params(&query);
    let (rows, total) = state.repo::<Category>(Category::TABLE)?.paginate("name", &params).await?;
    let data = rows.into_iter().map(CategoryResponse::from).collect();

    Ok(ApiResponse::success("List Data Categories", api::Page::new(data, total, &params, &base)))
}

/// GET /api/admin/categories/all
pub async fn all(State(state): State<AppState>) -> ApiResult<Vec<CategoryResponse>> {
    let rows = state.repo::<Category>(Category::TABLE)?.all().await?;
    Ok(ApiResponse::success(
        "Lists Data Categories",
        rows.into_iter().map(CategoryResponse::from).collect(),
    ))
}

/// POST /api/admin/categories
pub async fn store(
    State(state): State<AppState>,
    payload: Result<Json<CategoryRequest>, JsonRejection>,
) -> ApiResult<CategoryResponse> {
    let input = input(json_body(payload)?)?;
    let category = Category::insert(&state.pool, &input).await?;
    Ok(ApiResponse::created("Success create category", category.into()))
}

/// GET /api/admin/categories/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<CategoryResponse> {
    let id = parse_id(&id)?;
    let category = state
        .repo::<Category>(Category::TABLE)?
        .find_or(id, "Category not found")
        .await?;
    Ok(ApiResponse::success("Category found", category.into()))
}

/// PUT /api/admin/categories/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<CategoryRequest>, JsonRejection>,
) -> ApiResult<CategoryResponse> {
    let id = parse_id(&id)?;
    let input = input(json_body(payload)?)?;
    let category = Category::update(&state.pool, id, &input).await?;
    Ok(ApiResponse::success("Success update category", category.into()))
}

/// DELETE /api/admin/categories/:id
pub async fn destroy(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let id = parse_id(&id)?;
    if !state.repo::<Category>(Category::TABLE)?.delete(id).await? {
        return Err(ApiError::not_found("Category not found"));
    }
    Ok(ApiResponse::message_only("Success delete category"))
}
