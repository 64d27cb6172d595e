use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use super::category::CategorySimple;
use super::format_timestamp;
use super::user::UserSimple;
use crate::database::DatabaseError;

#[derive(Debug, Clone, FromRow)]
pub struct Post {
    pub id: i64,
    pub image: String,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub category_id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A `post_details` row: the post plus category and author names
#[derive(Debug, Clone, FromRow)]
pub struct PostDetail {
    pub id: i64,
    pub image: String,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub category_id: i64,
    pub category_name: String,
    pub user_id: i64,
    pub user_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostResponse {
    pub id: i64,
    pub image: String,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub category_id: i64,
    pub user_id: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Post> for PostResponse {
    fn from(p: Post) -> Self {
        Self {
            id: p.id,
            image: p.image,
            title: p.title,
            slug: p.slug,
            content: p.content,
            category_id: p.category_id,
            user_id: p.user_id,
            created_at: format_timestamp(&p.created_at),
            updated_at: format_timestamp(&p.updated_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostWithRelation {
    pub id: i64,
    pub image: String,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub category: CategorySimple,
    pub user: UserSimple,
    pub created_at: String,
    pub updated_at: String,
}

impl From<PostDetail> for PostWithRelation {
    fn from(p: PostDetail) -> Self {
        Self {
            id: p.id,
            image: p.image,
            title: p.title,
            slug: p.slug,
            content: p.content,
            category: CategorySimple {
                id: p.category_id,
                name: p.category_name,
            },
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
pub struct PostInput {
    pub image: String,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub category_id: i64,
}

impl Post {
    pub const TABLE: &'static str = "posts";
    pub const DETAILS: &'static str = "post_details";

    pub async fn insert(pool: &PgPool, input: &PostInput, user_id: i64) -> Result<Post, DatabaseError> {
        let row = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (image, title, slug, content, category_id, user_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&input.image)
        .bind(&input.title)
        .bind(&input.slug)
        .bind(&input.content)
        .bind(input.category_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(row)
    }

    /// Author is left unchanged
    pub async fn update(pool: &PgPool, id: i64, input: &PostInput) -> Result<Post, DatabaseError> {
        sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET image = $1, title = $2, slug = $3, content = $4, category_id = $5, updated_at = now()
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(&input.image)
        .bind(&input.title)
        .bind(&input.slug)
        .bind(&input.content)
        .bind(input.category_id)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("Post not found".to_string()))
    }
}
