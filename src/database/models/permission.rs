use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use super::format_timestamp;
use crate::database::DatabaseError;

#[derive(Debug, Clone, FromRow)]
pub struct Permission {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PermissionResponse {
    pub id: i64,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Permission> for PermissionResponse {
    fn from(p: Permission) -> Self {
        Self {
            id: p.id,
            name: p.name,
            created_at: format_timestamp(&p.created_at),
            updated_at: format_timestamp(&p.updated_at),
        }
    }
}

impl Permission {
    pub const TABLE: &'static str = "permissions";

    pub async fn insert(pool: &PgPool, name: &str) -> Result<Permission, DatabaseError> {
        let row = sqlx::query_as::<_, Permission>("INSERT INTO permissions (name) VALUES ($1) RETURNING *")
            .bind(name)
            .fetch_one(pool)
            .await?;
        Ok(row)
    }

    pub async fn update(pool: &PgPool, id: i64, name: &str) -> Result<Permission, DatabaseError> {
        sqlx::query_as::<_, Permission>(
            "UPDATE permissions SET name = $1, updated_at = now() WHERE id = $2 RETURNING *",
        )
        .bind(name)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("Permission not found".to_string()))
    }

    /// Detach from every role, then delete
    pub async fn delete(pool: &PgPool, id: i64) -> Result<(), DatabaseError> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM role_permissions WHERE permission_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM permissions WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("Permission not found".to_string()));
        }

        tx.commit().await?;
        Ok(())
    }

    /// Insert `name` unless it exists; returns the id either way
    pub async fn upsert(pool: &PgPool, name: &str) -> Result<i64, DatabaseError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO permissions (name) VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id
            "#,
        )
        .bind(name)
        .fetch_one(pool)
        .await?;
        Ok(id)
    }
}
