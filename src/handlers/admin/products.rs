use axum::{
    extract::{Multipart, Path, Query, State},
    Extension,
};

use super::{discard_replaced, discard_upload, remove_image_after_delete};
use crate::api::{self, slugify, BaseUrl, MultipartForm, PageQuery};
use crate::database::models::{Product, ProductDetail, ProductInput, ProductResponse, ProductWithRelation};
use crate::error::ApiError;
use crate::handlers::{current_user, parse_id, Required};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::AppState;

const UPLOAD_DIR: &str = "products";

/// Text inputs of a product form, with `image` filled in by the caller
fn input(form: &MultipartForm, image: String) -> Result<ProductInput, ApiError> {
    let mut required = Required::new();
    let title = required.text("title", form.get("title"));
    let content = required.text("content", form.get("content"));
    let owner = required.text("owner", form.get("owner"));
    let price = required.integer("price", form.get("price"));
    let phone = required.text("phone", form.get("phone"));
    let address = required.text("address", form.get("address"));
    required.finish()?;

    Ok(ProductInput {
        image,
        slug: slugify(&title),
        title,
        content,
        owner,
        price,
        phone,
        address,
    })
}

/// GET /api/admin/products
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

/// POST /api/admin/products (multipart, `image` required)
pub async fn store(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    multipart: Multipart,
) -> ApiResult<ProductResponse> {
    let form = MultipartForm::collect(multipart).await?;
    let mut input = input(&form, String::new())?;
    let seller = current_user(&state, &auth).await?;

    let policy = state.uploads(UPLOAD_DIR);
    let stored = policy.store(form.file.as_ref()).await?;
    input.image = stored.file_name.clone();

    match Product::insert(&state.pool, &input, seller.id).await {
        Ok(product) => Ok(ApiResponse::created("Success create product", product.into())),
        Err(e) => {
            discard_upload(&policy, &stored.file_name).await;
            Err(e.into())
        }
    }
}

/// GET /api/admin/products/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<ProductResponse> {
    let id = parse_id(&id)?;
    let product = state
        .repo::<Product>(Product::TABLE)?
        .find_or(id, "Product not found")
        .await?;
    Ok(ApiResponse::success("Product found", product.into()))
}

/// PUT /api/admin/products/:id (multipart, `image` optional)
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> ApiResult<ProductResponse> {
    let id = parse_id(&id)?;
    let existing = state
        .repo::<Product>(Product::TABLE)?
        .find_or(id, "Product not found")
        .await?;

    let form = MultipartForm::collect(multipart).await?;
    let mut input = input(&form, existing.image.clone())?;

    let policy = state.uploads(UPLOAD_DIR);
    let replacement = match form.file.as_ref() {
        Some(file) => Some(policy.store(Some(file)).await?),
        None => None,
    };
    if let Some(stored) = &replacement {
        input.image = stored.file_name.clone();
    }

    match Product::update(&state.pool, id, &input).await {
        Ok(product) => {
            if replacement.is_some() {
                discard_replaced(&policy, &existing.image, &product.image).await;
            }
            Ok(ApiResponse::success("Success update product", product.into()))
        }
        Err(e) => {
            if let Some(stored) = replacement {
                discard_upload(&policy, &stored.file_name).await;
            }
            Err(e.into())
        }
    }
}

/// DELETE /api/admin/products/:id
pub async fn destroy(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let id = parse_id(&id)?;
    let repo = state.repo::<Product>(Product::TABLE)?;
    let product = repo.find_or(id, "Product not found").await?;

    repo.delete(id).await?;
    remove_image_after_delete(&state.uploads(UPLOAD_DIR), &product.image, "Product").await?;

    Ok(ApiResponse::message_only("Success delete product"))
}
