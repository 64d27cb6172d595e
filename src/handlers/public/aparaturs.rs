use axum::extract::{Path, Query, State};

use super::HOME_LIMIT;
use crate::api::{self, BaseUrl, PageQuery};
use crate::database::models::{Aparatur, AparaturResponse};
use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult};
use crate::AppState;

/// GET /api/public/aparaturs
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
    base: BaseUrl,
) -> ApiResult<api::Page<AparaturResponse>> {
    let params = state.page_params(&query);
    let (rows, total) = state.repo::<Aparatur>(Aparatur::TABLE)?.paginate("name", &params).await?;
    let data = rows.into_iter().map(AparaturResponse::from).collect();

    Ok(ApiResponse::success("List Data Aparaturs", api::Page::new(data, total, &params, &base)))
}

/// GET /api/public/aparaturs/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<AparaturResponse> {
    let id = parse_id(&id)?;
    let aparatur = state
        .repo::<Aparatur>(Aparatur::TABLE)?
        .find_or(id, "Aparatur not found")
        .await?;
    Ok(ApiResponse::success("Aparatur found", aparatur.into()))
}

/// GET /api/public/aparaturs/home
pub async fn home(State(state): State<AppState>) -> ApiResult<Vec<AparaturResponse>> {
    let rows = state.repo::<Aparatur>(Aparatur::TABLE)?.latest(HOME_LIMIT).await?;
    Ok(ApiResponse::success(
        "List Data Aparaturs",
        rows.into_iter().map(AparaturResponse::from).collect(),
    ))
}
