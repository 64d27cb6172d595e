use axum::extract::{Multipart, Path, Query, State};

use super::{discard_upload, remove_image_after_delete};
use crate::api::{self, BaseUrl, MultipartForm, PageQuery};
use crate::database::models::{Photo, PhotoInput, PhotoResponse};
use crate::handlers::{parse_id, Required};
use crate::middleware::{ApiResponse, ApiResult};
use crate::AppState;

const UPLOAD_DIR: &str = "photos";

/// GET /api/admin/photos
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

/// POST /api/admin/photos (multipart)
pub async fn store(State(state): State<AppState>, multipart: Multipart) -> ApiResult<PhotoResponse> {
    let form = MultipartForm::collect(multipart).await?;

    let mut required = Required::new();
    let caption = required.text("caption", form.get("caption"));
    let description = required.text("description", form.get("description"));
    required.finish()?;

    let policy = state.uploads(UPLOAD_DIR);
    let stored = policy.store(form.file.as_ref()).await?;

    let input = PhotoInput {
        image: stored.file_name.clone(),
        caption,
        description,
    };

    match Photo::insert(&state.pool, &input).await {
        Ok(photo) => Ok(ApiResponse::created("Success create photo", photo.into())),
        Err(e) => {
            discard_upload(&policy, &stored.file_name).await;
            Err(e.into())
        }
    }
}

/// DELETE /api/admin/photos/:id
pub async fn destroy(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let id = parse_id(&id)?;
    let repo = state.repo::<Photo>(Photo::TABLE)?;
    let photo = repo.find_or(id, "Photo not found").await?;

    repo.delete(id).await?;
    remove_image_after_delete(&state.uploads(UPLOAD_DIR), &photo.image, "Photo").await?;

    Ok(ApiResponse::message_only("Success delete photo"))
}
