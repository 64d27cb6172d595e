use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;

use super::format_timestamp;
use super::permission::{Permission, PermissionResponse};
use crate::database::DatabaseError;

#[derive(Debug, Clone, FromRow)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Role with its permissions. `permissions` is omitted when the role is
/// embedded in a user.
#[derive(Debug, Clone, Serialize)]
pub struct RoleResponse {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<PermissionResponse>>,
    pub created_at: String,
    pub updated_at: String,
}

impl RoleResponse {
    pub fn new(role: Role, permissions: Option<Vec<Permission>>) -> Self {
        Self {
            id: role.id,
            name: role.name,
            permissions: permissions.map(|list| list.into_iter().map(PermissionResponse::from).collect()),
            created_at: format_timestamp(&role.created_at),
            updated_at: format_timestamp(&role.updated_at),
        }
    }
}

#[derive(FromRow)]
struct RolePermissionRow {
    role_id: i64,
    #[sqlx(flatten)]
    permission: Permission,
}

impl Role {
    pub const TABLE: &'static str = "roles";

    /// Create the role and attach `permission_ids` (unknown ids are skipped)
    pub async fn insert(pool: &PgPool, name: &str, permission_ids: &[i64]) -> Result<Role, DatabaseError> {
        let mut tx = pool.begin().await?;

        let role = sqlx::query_as::<_, Role>("INSERT INTO roles (name) VALUES ($1) RETURNING *")
            .bind(name)
            .fetch_one(&mut *tx)
            .await?;

        attach_permissions(&mut tx, role.id, permission_ids).await?;

        tx.commit().await?;
        Ok(role)
    }

    /// Rename and replace the permission set
    pub async fn update(pool: &PgPool, id: i64, name: &str, permission_ids: &[i64]) -> Result<Role, DatabaseError> {
        let mut tx = pool.begin().await?;

        let role = sqlx::query_as::<_, Role>(
            "UPDATE roles SET name = $1, updated_at = now() WHERE id = $2 RETURNING *",
        )
        .bind(name)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("Role not found".to_string()))?;

        sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        attach_permissions(&mut tx, id, permission_ids).await?;

        tx.commit().await?;
        Ok(role)
    }

    /// Detach permissions and users, then delete
    pub async fn delete(pool: &PgPool, id: i64) -> Result<(), DatabaseError> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM user_roles WHERE role_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("Role not found".to_string()));
        }

        tx.commit().await?;
        Ok(())
    }

    /// Permissions for each of `role_ids`, ordered by permission id
    pub async fn permissions_for(pool: &PgPool, role_ids: &[i64]) -> Result<HashMap<i64, Vec<Permission>>, DatabaseError> {
        if role_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, RolePermissionRow>(
            r#"
            SELECT rp.role_id, p.id, p.name, p.created_at, p.updated_at
            FROM role_permissions rp
            JOIN permissions p ON p.id = rp.permission_id
            WHERE rp.role_id = ANY($1)
            ORDER BY p.id
            "#,
        )
        .bind(role_ids)
        .fetch_all(pool)
        .await?;

        let mut grouped: HashMap<i64, Vec<Permission>> = HashMap::new();
        for row in rows {
            grouped.entry(row.role_id).or_default().push(row.permission);
        }
        Ok(grouped)
    }

    /// Load permissions for `roles` and build responses in the same order
    pub async fn with_permissions(pool: &PgPool, roles: Vec<Role>) -> Result<Vec<RoleResponse>, DatabaseError> {
        let ids: Vec<i64> = roles.iter().map(|r| r.id).collect();
        let mut grouped = Self::permissions_for(pool, &ids).await?;

        Ok(roles
            .into_iter()
            .map(|role| {
                let permissions = grouped.remove(&role.id).unwrap_or_default();
                RoleResponse::new(role, Some(permissions))
            })
            .collect())
    }

    /// Insert `name` unless it exists and set its permissions to exactly
    /// the named ones
    pub async fn upsert_with_permission_names(pool: &PgPool, name: &str, permissions: &[&str]) -> Result<i64, DatabaseError> {
        let mut tx = pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO roles (name) VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id
            "#,
        )
        .bind(name)
        .fetch_one(&mut *tx)
        .await?;

        let names: Vec<String> = permissions.iter().map(|p| p.to_string()).collect();

        sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            r#"
            INSERT INTO role_permissions (role_id, permission_id)
            SELECT $1, id FROM permissions WHERE name = ANY($2)
            "#,
        )
        .bind(id)
        .bind(&names)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(id)
    }
}

async fn attach_permissions(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    role_id: i64,
    permission_ids: &[i64],
) -> Result<(), DatabaseError> {
    if permission_ids.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO role_permissions (role_id, permission_id)
        SELECT $1, id FROM permissions WHERE id = ANY($2)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(role_id)
    .bind(permission_ids)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
