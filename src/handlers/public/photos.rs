use axum::extract::{Query, State};

use super::HOME_LIMIT;
use crate::api::{self, BaseUrl, PageQuery};
use crate::database::models::{Photo, PhotoResponse};
use crate::middleware::{ApiResponse, ApiResult};
use crate::AppState;

/// GET /api/public/photos
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
    base: BaseUrl,
) -> ApiResult<api::Page<PhotoResponse>> {
    let params = state.page_params(&query);
    let (rows, total) = state.repo::<Photo>(Photo::TABLE)?.paginate("caption", &params).await?;
    let data = rows.into_iter().map(PhotoResponse::from).collect();

    Ok(ApiResponse::success("List Data Photos", api::Page::new(data, total, &params, &base)))
}

/// GET /api/public/photos/home
pub async fn home(State(state): State<AppState>) -> ApiResult<Vec<PhotoResponse>> {
    let rows = state.repo::<Photo>(Photo::TABLE)?.latest(HOME_LIMIT).await?;
    Ok(ApiResponse::success(
        "List Data Photos",
        rows.into_iter().map(PhotoResponse::from).collect(),
    ))
}
