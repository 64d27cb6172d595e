use axum::extract::{Multipart, Path, Query, State};

use super::{discard_replaced, discard_upload, remove_image_after_delete};
use crate::api::{self, BaseUrl, MultipartForm, PageQuery};
use crate::database::models::{Aparatur, AparaturInput, AparaturResponse};
use crate::error::ApiError;
use crate::handlers::{parse_id, Required};
use crate::middleware::{ApiResponse, ApiResult};
use crate::AppState;

const UPLOAD_DIR: &str = "aparaturs";

struct AparaturFields {
    name: String,
    position: String,
    description: String,
}

fn fields(form: &MultipartForm) -> Result<AparaturFields, ApiError> {
    let mut required = Required::new();
    let name = required.text("name", form.get("name"));
    let position = required.text("position", form.get("position"));
    let description = required.text("description", form.get("description"));
    required.finish()?;

    Ok(AparaturFields {
        name,
        position,
        description,
    })
}

/// GET /api/admin/aparaturs
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

/// POST /api/admin/aparaturs (multipart, `image` required)
pub async fn store(State(state): State<AppState>, multipart: Multipart) -> ApiResult<AparaturResponse> {
    let form = MultipartForm::collect(multipart).await?;
    let fields = fields(&form)?;

    let policy = state.uploads(UPLOAD_DIR);
    let stored = policy.store(form.file.as_ref()).await?;

    let input = AparaturInput {
        image: stored.file_name.clone(),
        name: fields.name,
        position: fields.position,
        description: fields.description,
    };

    match Aparatur::insert(&state.pool, &input).await {
        Ok(aparatur) => Ok(ApiResponse::created("Success create aparatur", aparatur.into())),
        Err(e) => {
            discard_upload(&policy, &stored.file_name).await;
            Err(e.into())
        }
    }
}

/// GET /api/admin/aparaturs/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<AparaturResponse> {
    let id = parse_id(&id)?;
    let aparatur = state
        .repo::<Aparatur>(Aparatur::TABLE)?
        .find_or(id, "Aparatur not found")
        .await?;
    Ok(ApiResponse::success("Aparatur found", aparatur.into()))
}

/// PUT /api/admin/aparaturs/:id (multipart, `image` optional)
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> ApiResult<AparaturResponse> {
    let id = parse_id(&id)?;
    let existing = state
        .repo::<Aparatur>(Aparatur::TABLE)?
        .find_or(id, "Aparatur not found")
        .await?;

    let form = MultipartForm::collect(multipart).await?;
    let fields = fields(&form)?;

    let policy = state.uploads(UPLOAD_DIR);
    let replacement = match form.file.as_ref() {
        Some(file) => Some(policy.store(Some(file)).await?),
        None => None,
    };

    let input = AparaturInput {
        image: replacement
            .as_ref()
            .map(|s| s.file_name.clone())
            .unwrap_or_else(|| existing.image.clone()),
        name: fields.name,
        position: fields.position,
        description: fields.description,
    };

    match Aparatur::update(&state.pool, id, &input).await {
        Ok(aparatur) => {
            if replacement.is_some() {
                discard_replaced(&policy, &existing.image, &aparatur.image).await;
            }
            Ok(ApiResponse::success("Success update aparatur", aparatur.into()))
        }
        Err(e) => {
            if let Some(stored) = replacement {
                discard_upload(&policy, &stored.file_name).await;
            }
            Err(e.into())
        }
    }
}

/// DELETE /api/admin/aparaturs/:id
pub async fn destroy(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let id = parse_id(&id)?;
    let repo = state.repo::<Aparatur>(Aparatur::TABLE)?;
    let aparatur = repo.find_or(id, "Aparatur not found").await?;

    repo.delete(id).await?;
    remove_image_after_delete(&state.uploads(UPLOAD_DIR), &aparatur.image, "Aparatur").await?;

    Ok(ApiResponse::message_only("Success delete aparatur"))
}
