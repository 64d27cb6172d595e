use axum::extract::{Path, Query, State};

use crate::api::{self, BaseUrl, PageQuery};
use crate::database::models::{Page, PageDetail, PageWithRelation};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::AppState;

/// GET /api/public/pages
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

/// GET /api/public/pages/:slug
pub async fn show(State(state): State<AppState>, Path(slug): Path<String>) -> ApiResult<PageWithRelation> {
    let page = state
        .repo::<PageDetail>(Page::DETAILS)?
        .find_by("slug", &slug)
        .await?
        .ok_or_else(|| ApiError::not_found("Page not found"))?;
    Ok(ApiResponse::success("Page found", page.into()))
}
