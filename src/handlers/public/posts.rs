use axum::extract::{Path, Query, State};

use super::HOME_LIMIT;
use crate::api::{self, BaseUrl, PageQuery};
use crate::database::models::{Post, PostDetail, PostWithRelation};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::AppState;

/// GET /api/public/posts
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
    base: BaseUrl,
) -> ApiResult<api::Page<PostWithRelation>> {
    let params = state.page_params(&query);
    let (rows, total) = state
        .repo::<PostDetail>(Post::DETAILS)?
        .paginate("title", &params)
        .await?;
    let data = rows.into_iter().map(PostWithRelation::from).collect();

    Ok(ApiResponse::success("List Data Posts", api::Page::new(data, total, &params, &base)))
}

/// GET /api/public/posts/:slug
pub async fn show(State(state): State<AppState>, Path(slug): Path<String>) -> ApiResult<PostWithRelation> {
    let post = state
        .repo::<PostDetail>(Post::DETAILS)?
        .find_by("slug", &slug)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;
    Ok(ApiResponse::success("Post found", post.into()))
}

/// GET /api/public/posts/home
pub async fn home(State(state): State<AppState>) -> ApiResult<Vec<PostWithRelation>> {
    let rows = state.repo::<PostDetail>(Post::DETAILS)?.latest(HOME_LIMIT).await?;
    Ok(ApiResponse::success(
        "List Data Posts",
        rows.into_iter().map(PostWithRelation::from).collect(),
    ))
}
