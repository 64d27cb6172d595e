use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;

use super::format_timestamp;
use super::role::{Role, RoleResponse};
use crate::database::DatabaseError;

/// A `users` row. The password column never leaves this type.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub email: String,
    pub roles: Vec<RoleResponse>,
    pub created_at: String,
    pub updated_at: String,
}

impl UserResponse {
    pub fn new(user: User, roles: Vec<Role>) -> Self {
        Self {
            id: user.id,
            name: user.name,
            username: user.username,
            email: user.email,
            roles: roles.into_iter().map(|r| RoleResponse::new(r, None)).collect(),
            created_at: format_timestamp(&user.created_at),
            updated_at: format_timestamp(&user.updated_at),
        }
    }
}

/// `{id, name}` as embedded in posts, pages and products
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserSimple {
    pub id: i64,
    pub name: String,
}

/// Fields written on create and update. `password_hash` of `None` keeps the
/// stored hash on update.
#[derive(Debug, Clone)]
pub struct UserInput {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub role_ids: Vec<i64>,
}

#[derive(FromRow)]
struct UserRoleRow {
    user_id: i64,
    #[sqlx(flatten)]
    role: Role,
}

impl User {
    pub const TABLE: &'static str = "users";

    pub async fn insert(pool: &PgPool, input: &UserInput) -> Result<User, DatabaseError> {
        let password = input.password_hash.as_deref().unwrap_or_default();
        let mut tx = pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, username, email, password)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(&input.username)
        .bind(&input.email)
        .bind(password)
        .fetch_one(&mut *tx)
        .await?;

        replace_roles(&mut tx, user.id, &input.role_ids).await?;

        tx.commit().await?;
        Ok(user)
    }

    /// Update profile fields, re-hash only when a new hash is supplied, and
    /// replace the role set
    pub async fn update(pool: &PgPool, id: i64, input: &UserInput) -> Result<User, DatabaseError> {
        let mut tx = pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = $1, username = $2, email = $3,
                password = COALESCE($4, password), updated_at = now()
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(&input.username)
        .bind(&input.email)
        .bind(input.password_hash.as_deref())
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("User not found".to_string()))?;

        replace_roles(&mut tx, id, &input.role_ids).await?;

        tx.commit().await?;
        Ok(user)
    }

    /// Detach roles, then delete
    pub async fn delete(pool: &PgPool, id: i64) -> Result<(), DatabaseError> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("User not found".to_string()));
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(pool)
            .await?;
        Ok(user)
    }

    /// Roles of each of `user_ids`, ordered by role id
    pub async fn roles_for(pool: &PgPool, user_ids: &[i64]) -> Result<HashMap<i64, Vec<Role>>, DatabaseError> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, UserRoleRow>(
            r#"
            SELECT ur.user_id, r.id, r.name, r.created_at, r.updated_at
            FROM user_roles ur
            JOIN roles r ON r.id = ur.role_id
            WHERE ur.user_id = ANY($1)
            ORDER BY r.id
            "#,
        )
        .bind(user_ids)
        .fetch_all(pool)
        .await?;

        let mut grouped: HashMap<i64, Vec<Role>> = HashMap::new();
        for row in rows {
            grouped.entry(row.user_id).or_default().push(row.role);
        }
        Ok(grouped)
    }

    /// Load roles for `users` and build responses in the same order
    pub async fn with_roles(pool: &PgPool, users: Vec<User>) -> Result<Vec<UserResponse>, DatabaseError> {
        let ids: Vec<i64> = users.iter().map(|u| u.id).collect();
        let mut grouped = Self::roles_for(pool, &ids).await?;

        Ok(users
            .into_iter()
            .map(|user| {
                let roles = grouped.remove(&user.id).unwrap_or_default();
                UserResponse::new(user, roles)
            })
            .collect())
    }

    /// Create or refresh a user by username and set its roles by name
    pub async fn upsert_with_role_names(
        pool: &PgPool,
        name: &str,
        username: &str,
        email: &str,
        password_hash: &str,
        roles: &[&str],
    ) -> Result<i64, DatabaseError> {
        let mut tx = pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (name, username, email, password)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (username) DO UPDATE
            SET email = EXCLUDED.email, password = EXCLUDED.password, updated_at = now()
            RETURNING id
            "#,
        )
        .bind(name)
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .await?;

        let names: Vec<String> = roles.iter().map(|r| r.to_string()).collect();

        sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            SELECT $1, id FROM roles WHERE name = ANY($2)
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

async fn replace_roles(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user_id: i64,
    role_ids: &[i64],
) -> Result<(), DatabaseError> {
    sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut **tx)
        .await?;

    if role_ids.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO user_roles (user_id, role_id)
        SELECT $1, id FROM roles WHERE id = ANY($2)
        "#,
    )
    .bind(user_id)
    .bind(role_ids)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
