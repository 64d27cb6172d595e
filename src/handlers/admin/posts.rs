use axum::{
    extract::{Multipart, Path, Query, State},
    Extension,
};

use super::{discard_replaced, discard_upload, remove_image_after_delete};
use crate::api::{self, slugify, BaseUrl, MultipartForm, PageQuery};
use crate::database::models::{Post, PostDetail, PostInput, PostResponse, PostWithRelation};
use crate::handlers::{current_user, parse_id, Required};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::AppState;

const UPLOAD_DIR: &str = "posts";

struct PostFields {
    title: String,
    content: String,
    category_id: i64,
}

fn fields(form: &MultipartForm) -> Result<PostFields, crate::error::ApiError> {
    let mut required = Required::new();
    let title = required.text("title", form.get("title"));
    let content = required.text("content", form.get("content"));
    let category_id = required.integer("category_id", form.get("category_id"));
    required.finish()?;

    Ok(PostFields {
        title,
        content,
        category_id,
    })
}

/// GET /api/admin/posts
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
    base: BaseUrl,
) -> ApiResult<api::Page<PostWithRelation>> {
    let params = state.page_params(&query);
    let (rows, total) = state
        .repo::<PostDetail>(Post::DETAILS)?
        .paginate("title", &params)
        .await?;
    let data = rows.into_iter().map(PostWithRelation::from).collect();

    Ok(ApiResponse::success("List Data Posts", api::Page::new(data, total, &params, &base)))
}

/// POST /api/admin/posts (multipart, `image` required)
pub async fn store(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    multipart: Multipart,
) -> ApiResult<PostResponse> {
    let form = MultipartForm::collect(multipart).await?;
    let fields = fields(&form)?;
    let author = current_user(&state, &auth).await?;

    let policy = state.uploads(UPLOAD_DIR);
    let stored = policy.store(form.file.as_ref()).await?;

    let input = PostInput {
        image: stored.file_name.clone(),
        slug: slugify(&fields.title),
        title: fields.title,
        content: fields.content,
        category_id: fields.category_id,
    };

    match Post::insert(&state.pool, &input, author.id).await {
        Ok(post) => Ok(ApiResponse::created("Post created successfully", post.into())),
        Err(e) => {
            discard_upload(&policy, &stored.file_name).await;
            Err(e.into())
        }
    }
}

/// GET /api/admin/posts/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<PostResponse> {
    let id = parse_id(&id)?;
    let post = state.repo::<Post>(Post::TABLE)?.find_or(id, "Post not found").await?;
    Ok(ApiResponse::success("Post found", post.into()))
}

/// PUT /api/admin/posts/:id (multipart, `image` optional)
///
/// A new image replaces the old one only once the row is saved; if the save
/// fails the new file is discarded instead.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> ApiResult<PostResponse> {
    let id = parse_id(&id)?;
    let existing = state.repo::<Post>(Post::TABLE)?.find_or(id, "Post not found").await?;

    let form = MultipartForm::collect(multipart).await?;
    let fields = fields(&form)?;

    let policy = state.uploads(UPLOAD_DIR);
    let replacement = match form.file.as_ref() {
        Some(file) => Some(policy.store(Some(file)).await?),
        None => None,
    };

    let input = PostInput {
        image: replacement
            .as_ref()
            .map(|s| s.file_name.clone())
            .unwrap_or_else(|| existing.image.clone()),
        slug: slugify(&fields.title),
        title: fields.title,
        content: fields.content,
        category_id: fields.category_id,
    };

    match Post::update(&state.pool, id, &input).await {
        Ok(post) => {
            if replacement.is_some() {
                discard_replaced(&policy, &existing.image, &post.image).await;
            }
            Ok(ApiResponse::success("Success update post", post.into()))
        }
        Err(e) => {
            if let Some(stored) = replacement {
                discard_upload(&policy, &stored.file_name).await;
            }
            Err(e.into())
        }
    }
}

/// DELETE /api/admin/posts/:id
pub async fn destroy(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let id = parse_id(&id)?;
    let repo = state.repo::<Post>(Post::TABLE)?;
    let post = repo.find_or(id, "Post not found").await?;

    repo.delete(id).await?;
    remove_image_after_delete(&state.uploads(UPLOAD_DIR), &post.image, "Post").await?;

    Ok(ApiResponse::message_only("Success delete post"))
}
