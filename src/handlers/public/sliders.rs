use axum::extract::State;

use crate::database::models::{Slider, SliderResponse};
use crate::middleware::{ApiResponse, ApiResult};
use crate::AppState;

/// GET /api/public/sliders, every slider newest first
pub async fn index(State(state): State<AppState>) -> ApiResult<Vec<SliderResponse>> {
    let rows = state.repo::<Slider>(Slider::TABLE)?.all().await?;
    Ok(ApiResponse::success(
        "Lists Data Sliders",
        rows.into_iter().map(SliderResponse::from).collect(),
    ))
}
