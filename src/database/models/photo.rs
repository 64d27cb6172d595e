use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use super::format_timestamp;
use crate::database::DatabaseError;

#[derive(Debug, Clone, FromRow)]
pub struct Photo {
    pub id: i64,
    pub image: String,
    pub caption: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PhotoResponse {
    pub id: i64,
    pub image: String,
    pub caption: String,
    pub description: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Photo> for PhotoResponse {
    fn from(p: Photo) -> Self {
        Self {
            id: p.id,
            image: p.image,
            caption: p.caption,
            description: p.description,
            created_at: format_timestamp(&p.created_at),
            updated_at: format_timestamp(&p.updated_at),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PhotoInput {
    pub image: String,
    pub caption: String,
    pub description: String,
}

impl Photo {
    pub const TABLE: &'static str = "photos";

    pub async fn insert(pool: &PgPool, input: &PhotoInput) -> Result<Photo, DatabaseError> {
        let row = sqlx::query_as::<_, Photo>(
            "INSERT INTO photos (image, caption, description) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&input.image)
        .bind(&input.caption)
        .bind(&input.description)
        .fetch_one(pool)
        .await?;
        Ok(row)
    }
}
