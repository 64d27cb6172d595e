use axum::extract::State;

use crate::database::models::{Aparatur, Category, DashboardCounts, Post, Product};
use crate::middleware::{ApiResponse, ApiResult};
use crate::AppState;

/// GET /api/admin/dashboard
pub async fn index(State(state): State<AppState>) -> ApiResult<DashboardCounts> {
    let categories = state.repo::<Category>(Category::TABLE)?;
    let posts = state.repo::<Post>(Post::TABLE)?;
    let products = state.repo::<Product>(Product::TABLE)?;
    let aparaturs = state.repo::<Aparatur>(Aparatur::TABLE)?;

    let (categories_count, posts_count, products_count, aparaturs_count) =
        futures::try_join!(categories.count(), posts.count(), products.count(), aparaturs.count())?;

    Ok(ApiResponse::success(
        "Dashboard stats retrieved successfully",
        DashboardCounts {
            categories_count,
            posts_count,
            products_count,
            aparaturs_count,
        },
    ))
}
