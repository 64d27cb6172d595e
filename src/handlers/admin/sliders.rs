use axum::extract::{Multipart, Path, Query, State};

use super::{discard_upload, remove_image_after_delete};
use crate::api::{self, BaseUrl, MultipartForm, PageQuery};
use crate::database::models::{Slider, SliderInput, SliderResponse};
use crate::handlers::{parse_id, Required};
use crate::middleware::{ApiResponse, ApiResult};
use crate::AppState;

const UPLOAD_DIR: &str = "sliders";

/// GET /api/admin/sliders
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
    base: BaseUrl,
) -> ApiResult<api::Page<SliderResponse>> {
    let params = state.page_params(&query);
    let (rows, total) = state
        .repo::<Slider>(Slider::TABLE)?
        .paginate("description", &params)
        .await?;
    let data = rows.into_iter().map(SliderResponse::from).collect();

    Ok(ApiResponse::success("List Data Sliders", api::Page::new(data, total, &params, &base)))
}

/// POST /api/admin/sliders (multipart)
pub async fn store(State(state): State<AppState>, multipart: Multipart) -> ApiResult<SliderResponse> {
    let form = MultipartForm::collect(multipart).await?;

    let mut required = Required::new();
    let description = required.text("description", form.get("description"));
    required.finish()?;

    let policy = state.uploads(UPLOAD_DIR);
    let stored = policy.store(form.file.as_ref()).await?;

    let input = SliderInput {
        image: stored.file_name.clone(),
        description,
    };

    match Slider::insert(&state.pool, &input).await {
        Ok(slider) => Ok(ApiResponse::created("Success create slider", slider.into())),
        Err(e) => {
            discard_upload(&policy, &stored.file_name).await;
            Err(e.into())
        }
    }
}

/// DELETE /api/admin/sliders/:id
pub async fn destroy(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let id = parse_id(&id)?;
    let repo = state.repo::<Slider>(Slider::TABLE)?;
    let slider = repo.find_or(id, "Slider not found").await?;

    repo.delete(id).await?;
    remove_image_after_delete(&state.uploads(UPLOAD_DIR), &slider.image, "Slider").await?;

    Ok(ApiResponse::message_only("Success delete slider"))
}
