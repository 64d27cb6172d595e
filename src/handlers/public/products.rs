use axum::extract::{Path, Query, State};

use super::HOME_LIMIT;
use crate::api::{self, BaseUrl, PageQuery};
use crate::database::models::{Product, ProductDetail, ProductWithRelation};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::AppState;

/// GET /api/public/products
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
    base: BaseUrl,
) -> ApiResult<api::Page<ProductWithRelation>> {
    let params = state.page_params(&query);
    let (rows, total) = state
        .repo::<ProductDetail>(Product::DETAILS)?
        .paginate("title", &params)
        .await?;
    let data = rows.into_iter().map(ProductWithRelation::from).collect();

    Ok(ApiResponse::success("List Data Products", api::Page::new(data, total, &params, &base)))
}

/// GET /api/public/products/:slug
pub async fn show(State(state): State<AppState>, Path(slug): Path<String>) -> ApiResult<ProductWithRelation> {
    let product = state
        .repo::<ProductDetail>(Product::DETAILS)?
        .find_by("slug", &slug)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;
    Ok(ApiResponse::success("Product found", product.into()))
}

/// GET /api/public/products/home
pub async fn home(State(state): State<AppState>) -> ApiResult<Vec<ProductWithRelation>> {
    let rows = state.repo::<ProductDetail>(Product::DETAILS)?.latest(HOME_LIMIT).await?;
    Ok(ApiResponse::success(
        "List Data Products",
        rows.into_iter().map(ProductWithRelation::from).collect(),
    ))
}
