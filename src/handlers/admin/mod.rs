//! Handlers behind `/api/admin`. Each route is wrapped with exactly one
//! permission in `routes.rs`.

pub mod aparaturs;
pub mod categories;
pub mod dashboard;
pub mod pages;
pub mod permissions;
pub mod photos;
pub mod posts;
pub mod products;
pub mod roles;
pub mod sliders;
pub mod users;

use tracing::warn;

use crate::api::UploadPolicy;
use crate::error::{ApiError, FieldErrors};

/// After the row is gone, remove its image. Failure here is reported as a
/// partial failure rather than rolled back.
pub(crate) async fn remove_image_after_delete(
    policy: &UploadPolicy,
    image: &str,
    entity: &str,
) -> Result<(), ApiError> {
    if let Err(e) = policy.remove(image).await {
        let mut errors = FieldErrors::new();
        errors.insert("image".into(), format!("Failed to remove image file: {}", e));
        return Err(ApiError::partial_failure(
            format!("{} deleted but failed to remove image", entity),
            errors,
        ));
    }
    Ok(())
}

/// Discard a freshly stored upload whose row write failed
pub(crate) async fn discard_upload(policy: &UploadPolicy, file_name: &str) {
    if let Err(e) = policy.remove(file_name).await {
        warn!("Failed to discard orphaned upload {}: {}", file_name, e);
    }
}

/// Remove the image a row no longer references. Logged, never fatal.
pub(crate) async fn discard_replaced(policy: &UploadPolicy, old: &str, new: &str) {
    if old != new {
        discard_upload(policy, old).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::UploadedFile;
    use axum::http::StatusCode;

    fn policy(dir: &tempfile::TempDir) -> UploadPolicy {
        UploadPolicy::images(dir.path(), 10 << 20)
    }

    async fn stored(policy: &UploadPolicy) -> String {
        let file = UploadedFile {
            file_name: "foto.jpg".to_string(),
            bytes: vec![1, 2, 3],
        };
        policy.store(Some(&file)).await.unwrap().file_name
    }

    #[tokio::test]
    async fn delete_removes_image_file() {
        let dir = tempfile::tempdir().unwrap();
        let policy = policy(&dir);
        let name = stored(&policy).await;

        remove_image_after_delete(&policy, &name, "Post").await.unwrap();
        assert!(!dir.path().join(&name).exists());

        // already gone is still fine
        remove_image_after_delete(&policy, &name, "Post").await.unwrap();
    }

    #[tokio::test]
    async fn failed_removal_is_partial_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("stuck.jpg");
        std::fs::create_dir(&blocker).unwrap();
        std::fs::write(blocker.join("inner"), b"x").unwrap();

        let err = remove_image_after_delete(&policy(&dir), "stuck.jpg", "Post")
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::PartialFailure { .. }));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Post deleted but failed to remove image");
        assert!(err.field_errors().unwrap()["image"].starts_with("Failed to remove image file"));
        assert!(blocker.exists());
    }

    #[tokio::test]
    async fn discard_upload_removes_orphan() {
        let dir = tempfile::tempdir().unwrap();
        let policy = policy(&dir);
        let name = stored(&policy).await;

        discard_upload(&policy, &name).await;
        assert!(!dir.path().join(&name).exists());
    }

    #[tokio::test]
    async fn discard_replaced_keeps_image_still_in_use() {
        let dir = tempfile::tempdir().unwrap();
        let policy = policy(&dir);
        let kept = stored(&policy).await;

        discard_replaced(&policy, &kept, &kept).await;
        assert!(dir.path().join(&kept).exists());

        let replacement = stored(&policy).await;
        discard_replaced(&policy, &kept, &replacement).await;
        assert!(!dir.path().join(&kept).exists());
        assert!(dir.path().join(&replacement).exists());
    }
}
