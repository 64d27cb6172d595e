use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use super::format_timestamp;
use super::user::UserSimple;
use crate::database::DatabaseError;

/// Village product listed by a seller
#[derive(Debug, Clone, FromRow)]
pub struct Product {
    pub id: i64,
    pub image: String,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub owner: String,
    pub price: i64,
    pub phone: String,
    pub address: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ProductDetail {
    pub id: i64,
    pub image: String,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub owner: String,
    pub price: i64,
    pub phone: String,
    pub address: String,
    pub user_id: i64,
    pub user_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductResponse {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub image: String,
    pub owner: String,
    pub price: i64,
    pub phone: String,
    pub address: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            title: p.title,
            slug: p.slug,
            content: p.content,
            image: p.image,
            owner: p.owner,
            price: p.price,
            phone: p.phone,
            address: p.address,
            created_at: format_timestamp(&p.created_at),
            updated_at: format_timestamp(&p.updated_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductWithRelation {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub image: String,
    pub owner: String,
    pub price: i64,
    pub phone: String,
    pub address: String,
    pub user: UserSimple,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ProductDetail> for ProductWithRelation {
    fn from(p: ProductDetail) -> Self {
        Self {
            id: p.id,
            title: p.title,
            slug: p.slug,
            content: p.content,
            image: p.image,
            owner: p.owner,
            price: p.price,
            phone: p.phone,
            address: p.address,
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
pub struct ProductInput {
    pub image: String,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub owner: String,
    pub price: i64,
    pub phone: String,
    pub address: String,
}

impl Product {
    pub const TABLE: &'static str = "products";
    pub const DETAILS: &'static str = "product_details";

    pub async fn insert(pool: &PgPool, input: &ProductInput, user_id: i64) -> Result<Product, DatabaseError> {
        let row = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (image, title, slug, content, owner, price, phone, address, user_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&input.image)
        .bind(&input.title)
        .bind(&input.slug)
        .bind(&input.content)
        .bind(&input.owner)
        .bind(input.price)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(row)
    }

    pub async fn update(pool: &PgPool, id: i64, input: &ProductInput) -> Result<Product, DatabaseError> {
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET image = $1, title = $2, slug = $3, content = $4, owner = $5,
                price = $6, phone = $7, address = $8, updated_at = now()
            WHERE id = $9
            RETURNING *
            "#,
        )
        .bind(&input.image)
        .bind(&input.title)
        .bind(&input.slug)
        .bind(&input.content)
        .bind(&input.owner)
        .bind(input.price)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("Product not found".to_string()))
    }
}
