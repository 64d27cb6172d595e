use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use super::format_timestamp;
use crate::database::DatabaseError;

/// Village official
#[derive(Debug, Clone, FromRow)]
pub struct Aparatur {
    pub id: i64,
    pub image: String,
    pub name: String,
    pub position: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AparaturResponse {
    pub id: i64,
    pub image: String,
    pub name: String,
    pub position: String,
    pub description: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Aparatur> for AparaturResponse {
    fn from(a: Aparatur) -> Self {
        Self {
            id: a.id,
            image: a.image,
            name: a.name,
            position: a.position,
            description: a.description,
            created_at: format_timestamp(&a.created_at),
            updated_at: format_timestamp(&a.updated_at),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AparaturInput {
    pub image: String,
    pub name: String,
    pub position: String,
    pub description: String,
}

impl Aparatur {
    pub const TABLE: &'static str = "aparaturs";

    pub async fn insert(pool: &PgPool, input: &AparaturInput) -> Result<Aparatur, DatabaseError> {
        let row = sqlx::query_as::<_, Aparatur>(
            r#"
            INSERT INTO aparaturs (image, name, position, description)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&input.image)
        .bind(&input.name)
        .bind(&input.position)
        .bind(&input.description)
        .fetch_one(pool)
        .await?;
        Ok(row)
    }

    pub async fn update(pool: &PgPool, id: i64, input: &AparaturInput) -> Result<Aparatur, DatabaseError> {
        sqlx::query_as::<_, Aparatur>(
            r#"
            UPDATE aparaturs
            SET image = $1, name = $2, position = $3, description = $4, updated_at = now()
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(&input.image)
        .bind(&input.name)
        .bind(&input.position)
        .bind(&input.description)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("Aparatur not found".to_string()))
    }
}
