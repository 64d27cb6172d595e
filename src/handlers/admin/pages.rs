use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::api::{self, slugify, BaseUrl, PageQuery};
use crate::database::models::{Page, PageDetail, PageInput, PageResponse, PageWithRelation};
use crate::error::ApiError;
use crate::handlers::{current_user, json_body, parse_id, Required};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PageRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

fn input(body: PageRequest) -> Result<PageInput, ApiError> {
    let mut required = Required::new();
    let title = required.text("title", body.title.as_deref());
    let content = required.text("content", body.content.as_deref());
    required.finish()?;

    Ok(PageInput {
        slug: slugify(&title),
        title,
        content,
    })
}

/// GET /api/admin/pages
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
    base: BaseUrl,
) -> ApiResult<api::Page<PageWithRelation>> {
    let params = state.page_params(&query);
    let (rows, total) = state
        .repo::<PageDetail>(Page::DETAILS)?
        .paginate("title", &params)
        .await?;
    let data = rows.into_iter().map(PageWithRelation::from).collect();

    Ok(ApiResponse::success("List Data Pages", api::Page::new(data, total, &params, &base)))
}

/// POST /api/admin/pages
pub async fn store(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<PageRequest>, JsonRejection>,
) -> ApiResult<PageResponse> {
    let input = input(json_body(payload)?)?;
    let author = current_user(&state, &auth).await?;
    let page = Page::insert(&state.pool, &input, author.id).await?;
    Ok(ApiResponse::created("Page created successfully", page.into()))
}

/// GET /api/admin/pages/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<PageResponse> {
    let id = parse_id(&id)?;
    let page = state.repo::<Page>(Page::TABLE)?.find_or(id, "Page not found").await?;
    Ok(ApiResponse::success("Page found", page.into()))
}

/// PUT /api/admin/pages/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<PageRequest>, JsonRejection>,
) -> ApiResult<PageResponse> {
    let id = parse_id(&id)?;
    let input = input(json_body(payload)?)?;
    let page = Page::update(&state.pool, id, &input).await?;
    Ok(ApiResponse::success("Success update page", page.into()))
}

/// DELETE /api/admin/pages/:id
pub async fn destroy(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let id = parse_id(&id)?;
    if !state.repo::<Page>(Page::TABLE)?.delete(id).await? {
        return Err(ApiError::not_found("Page not found"));
    }
    Ok(ApiResponse::message_only("Success delete page"))
}
