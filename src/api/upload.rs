//! Image upload validation and persistence.

use axum::extract::Multipart;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{ApiError, FieldErrors};

pub const IMAGE_TYPES: &[&str] = &[".jpg", ".jpeg", ".png", ".gif"];

/// Multipart field carrying the uploaded file
pub const FILE_FIELD: &str = "image";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("File is required")]
    Missing,

    #[error("File size to large")]
    TooLarge { max_size: u64 },

    #[error("Invalid file type")]
    InvalidType { allowed: Vec<String> },

    #[error("Failed to save file")]
    Io(#[from] std::io::Error),
}

impl UploadError {
    /// Field-level description of the rejection
    pub fn field_errors(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        match self {
            UploadError::Missing => {
                errors.insert("file".into(), "No file was uploaded".into());
            }
            UploadError::TooLarge { max_size } => {
                errors.insert("file".into(), format!("Maximum file is: {}MB", max_size / (1 << 20)));
            }
            UploadError::InvalidType { allowed } => {
                errors.insert("file".into(), format!("Allowed file types: [{}]", allowed.join(" ")));
            }
            UploadError::Io(e) => {
                errors.insert("system".into(), e.to_string());
            }
        }
        errors
    }
}

/// File received from a multipart request, held in memory
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Lowercased extension including the dot, or empty
    pub fn extension(&self) -> String {
        Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_lowercase()))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub file_name: String,
    pub path: PathBuf,
}

/// Constraints for one upload destination
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub allowed_types: Vec<String>,
    pub max_size: u64,
    pub destination: PathBuf,
}

impl UploadPolicy {
    pub fn new(allowed_types: &[&str], max_size: u64, destination: impl Into<PathBuf>) -> Self {
        Self {
            allowed_types: allowed_types.iter().map(|t| t.to_lowercase()).collect(),
            max_size,
            destination: destination.into(),
        }
    }

    /// `.jpg .jpeg .png .gif` into `destination`
    pub fn images(destination: impl Into<PathBuf>, max_size: u64) -> Self {
        Self::new(IMAGE_TYPES, max_size, destination)
    }

    /// Check size and extension without touching the filesystem
    pub fn validate(&self, file: Option<&UploadedFile>) -> Result<(), UploadError> {
        let file = file.ok_or(UploadError::Missing)?;

        if file.size() > self.max_size {
            return Err(UploadError::TooLarge { max_size: self.max_size });
        }

        let ext = file.extension();
        if !self.allowed_types.iter().any(|t| *t == ext) {
            return Err(UploadError::InvalidType {
                allowed: self.allowed_types.clone(),
            });
        }

        Ok(())
    }

    /// Validate and write the file under a fresh `<uuid><ext>` name
    pub async fn store(&self, file: Option<&UploadedFile>) -> Result<StoredFile, UploadError> {
        self.validate(file)?;
        let file = file.ok_or(UploadError::Missing)?;

        let file_name = format!("{}{}", Uuid::new_v4(), file.extension());
        let path = self.destination.join(&file_name);

        tokio::fs::create_dir_all(&self.destination).await?;
        tokio::fs::write(&path, &file.bytes).await?;

        debug!("Stored upload {} ({} bytes) at {}", file.file_name, file.size(), path.display());
        Ok(StoredFile { file_name, path })
    }

    /// Remove a previously stored file from `destination`
    pub async fn remove(&self, file_name: &str) -> std::io::Result<()> {
        remove_file(&self.destination, file_name).await
    }
}

/// Best-effort removal of `dir/file_name`. A file that is already gone
/// counts as removed.
pub async fn remove_file(dir: &Path, file_name: &str) -> std::io::Result<()> {
    if file_name.is_empty() {
        return Ok(());
    }
    match tokio::fs::remove_file(dir.join(file_name)).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => {
            warn!("Failed to remove {}: {}", file_name, e);
            Err(e)
        }
    }
}

/// Text fields plus the optional `image` part of a multipart request
#[derive(Debug, Default)]
pub struct MultipartForm {
    pub fields: HashMap<String, String>,
    pub file: Option<UploadedFile>,
}

impl MultipartForm {
    pub async fn collect(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = MultipartForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
        {
            let name = field.name().unwrap_or_default().to_string();

            if name == FILE_FIELD {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Invalid file part: {}", e)))?;
                // browsers send an empty part when no file was chosen
                if !file_name.is_empty() || !bytes.is_empty() {
                    form.file = Some(UploadedFile {
                        file_name,
                        bytes: bytes.to_vec(),
                    });
                }
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Invalid field '{}': {}", name, e)))?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    /// Raw text field
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Trimmed, non-empty text field
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, size: usize) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            bytes: vec![0u8; size],
        }
    }

    #[test]
    fn rejects_missing_file() {
        let policy = UploadPolicy::images("unused", 10 << 20);
        let err = policy.validate(None).unwrap_err();
        assert!(matches!(err, UploadError::Missing));
        assert_eq!(err.field_errors()["file"], "No file was uploaded");
    }

    #[test]
    fn rejects_file_over_limit() {
        let policy = UploadPolicy::images("unused", 10 << 20);
        let err = policy.validate(Some(&file("big.jpg", 11 << 20))).unwrap_err();
        assert!(matches!(err, UploadError::TooLarge { .. }));
        assert_eq!(err.field_errors()["file"], "Maximum file is: 10MB");
    }

    #[test]
    fn rejects_disallowed_extension() {
        let policy = UploadPolicy::images("unused", 10 << 20);
        let err = policy.validate(Some(&file("setup.exe", 10))).unwrap_err();
        assert!(matches!(err, UploadError::InvalidType { .. }));
        assert!(err.field_errors()["file"].contains(".jpg"));
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let policy = UploadPolicy::images("unused", 10 << 20);
        assert!(policy.validate(Some(&file("FOTO.PNG", 10))).is_ok());
        assert!(policy.validate(Some(&file("noext", 10))).is_err());
    }

    #[tokio::test]
    async fn stores_under_generated_name() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let destination = dir.path().join("posts");
        let policy = UploadPolicy::images(&destination, 10 << 20);

        let stored = policy.store(Some(&file("Kantor Desa.JPEG", 64))).await?;

        assert!(stored.file_name.ends_with(".jpeg"));
        assert_ne!(stored.file_name, "Kantor Desa.JPEG");
        assert_eq!(std::fs::metadata(&stored.path)?.len(), 64);

        let again = policy.store(Some(&file("Kantor Desa.JPEG", 64))).await?;
        assert_ne!(stored.file_name, again.file_name);
        Ok(())
    }

    #[tokio::test]
    async fn remove_tolerates_missing_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let policy = UploadPolicy::images(dir.path(), 10 << 20);

        let stored = policy.store(Some(&file("a.gif", 1))).await?;
        policy.remove(&stored.file_name).await?;
        assert!(!stored.path.exists());
        policy.remove(&stored.file_name).await?;
        Ok(())
    }
}
