use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use super::format_timestamp;
use crate::database::DatabaseError;

#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryResponse {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            slug: c.slug,
            created_at: format_timestamp(&c.created_at),
            updated_at: format_timestamp(&c.updated_at),
        }
    }
}

/// `{id, name}` as embedded in posts
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CategorySimple {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct CategoryInput {
    pub name: String,
    pub slug: String,
}

impl Category {
    pub const TABLE: &'static str = "categories";

    pub async fn insert(pool: &PgPool, input: &CategoryInput) -> Result<Category, DatabaseError> {
        let row = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name, slug) VALUES ($1, $2) RETURNING *",
        )
        .bind(&input.name)
        .bind(&input.slug)
        .fetch_one(pool)
        .await?;
        Ok(row)
    }

    pub async fn update(pool: &PgPool, id: i64, input: &CategoryInput) -> Result<Category, DatabaseError> {
        sqlx::query_as::<_, Category>(
            "UPDATE categories SET name = $1, slug = $2, updated_at = now() WHERE id = $3 RETURNING *",
        )
        .bind(&input.name)
        .bind(&input.slug)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("Category not found".to_string()))
    }
}
