use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use super::format_timestamp;
use crate::database::DatabaseError;

#[derive(Debug, Clone, FromRow)]
pub struct Slider {
    pub id: i64,
    pub image: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SliderResponse {
    pub id: i64,
    pub image: String,
    pub description: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Slider> for SliderResponse {
    fn from(s: Slider) -> Self {
        Self {
            id: s.id,
            image: s.image,
            description: s.description,
            created_at: format_timestamp(&s.created_at),
            updated_at: format_timestamp(&s.updated_at),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SliderInput {
    pub image: String,
    pub description: String,
}

impl Slider {
    pub const TABLE: &'static str = "sliders";

    pub async fn insert(pool: &PgPool, input: &SliderInput) -> Result<Slider, DatabaseError> {
        let row = sqlx::query_as::<_, Slider>(
            "INSERT INTO sliders (image, description) VALUES ($1, $2) RETURNING *",
        )
        .bind(&input.image)
        .bind(&input.description)
        .fetch_one(pool)
        .await?;
        Ok(row)
    }
}
