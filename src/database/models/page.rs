use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use super::format_timestamp;
use super::user::UserSimple;
use crate::database::DatabaseError;

#[derive(Debug, Clone, FromRow)]
pub struct Page {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct PageDetail {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub user_id: i64,
    pub user_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageResponse {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub user_id: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Page> for PageResponse {
    fn from(p: Page) -> Self {
        Self {
            id: p.id,
            title: p.title,
            slug: p.slug,
            content: p.content,
            user_id: p.user_id,
            created_at: format_timestamp(&p.created_at),
            updated_at: format_timestamp(&p.updated_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PageWithRelation {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub user: UserSimple,
    pub created_at: String,
    pub updated_at: String,
}

impl From<PageDetail> for PageWithRelation {
    fn from(p: PageDetail) -> Self {
        Self {
            id: p.id,
            title: p.title,
            slug: p.slug,
            content: p.content,
            user: UserSimple {
                id: p.user_id,
                name: p.user_name,
            },
            created_at: format_timestamp(&p.created_at),
            updated_at: format_timestamp(&p.updated_at),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PageInput {
    pub title: String,
    pub slug: String,
    pub content: String,
}

impl Page {
    pub const TABLE: &'static str = "pages";
    pub const DETAILS: &'static str = "page_details";

    pub async fn insert(pool: &PgPool, input: &PageInput, user_id: i64) -> Result<Page, DatabaseError> {
        let row = sqlx::query_as::<_, Page>(
            "INSERT INTO pages (title, slug, content, user_id) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(&input.title)
        .bind(&input.slug)
        .bind(&input.content)
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(row)
    }

    pub async fn update(pool: &PgPool, id: i64, input: &PageInput) -> Result<Page, DatabaseError> {
        sqlx::query_as::<_, Page>(
            r#"
            UPDATE pages SET title = $1, slug = $2, content = $3, updated_at = now()
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(&input.title)
        .bind(&input.slug)
        .bind(&input.content)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("Page not found".to_string()))
    }
}
