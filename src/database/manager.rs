use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Tables owned by this application, longest names first so constraint
/// prefixes resolve to the most specific table.
const TABLES: &[&str] = &[
    "role_permissions",
    "permissions",
    "user_roles",
    "categories",
    "aparaturs",
    "products",
    "sliders",
    "photos",
    "users",
    "roles",
    "posts",
    "pages",
];

/// Errors from the storage layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unique constraint violated: {}", constraint.as_deref().unwrap_or("<unknown>"))]
    UniqueViolation { constraint: Option<String> },

    #[error("Foreign key constraint violated: {}", constraint.as_deref().unwrap_or("<unknown>"))]
    ForeignKeyViolation { constraint: Option<String> },

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl DatabaseError {
    /// Column behind a unique violation, derived from the constraint name
    /// Postgres reports (`users_email_key` -> `email`).
    pub fn violated_field(&self) -> Option<String> {
        match self {
            DatabaseError::UniqueViolation { constraint: Some(name) } => field_from_constraint(name),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DatabaseError::NotFound("Record not found".to_string()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => DatabaseError::UniqueViolation {
                constraint: db_err.constraint().map(str::to_string),
            },
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => DatabaseError::ForeignKeyViolation {
                constraint: db_err.constraint().map(str::to_string),
            },
            other => DatabaseError::Sqlx(other),
        }
    }
}

fn field_from_constraint(constraint: &str) -> Option<String> {
    let rest = TABLES
        .iter()
        .find_map(|table| constraint.strip_prefix(table).and_then(|r| r.strip_prefix('_')))?;

    let column = rest.strip_suffix("_key").unwrap_or(rest);
    if column.is_empty() || column == "pkey" {
        return None;
    }
    Some(column.to_string())
}

/// Connection pool bootstrap and schema management
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open the shared connection pool
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&config.url)
            .await?;

        info!("Database pool ready (max {} connections)", config.max_connections);
        Ok(pool)
    }

    /// Apply embedded migrations from `migrations/`
    pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }

    /// Validate table, view and column identifiers before they are spliced
    /// into SQL text: lowercase ascii, digits and underscore only.
    pub fn is_valid_identifier(name: &str) -> bool {
        !name.is_empty()
            && name.len() <= 63
            && name.chars().next().is_some_and(|c| c.is_ascii_lowercase())
            && name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_identifiers() {
        assert!(DatabaseManager::is_valid_identifier("posts"));
        assert!(DatabaseManager::is_valid_identifier("post_details"));
        assert!(!DatabaseManager::is_valid_identifier(""));
        assert!(!DatabaseManager::is_valid_identifier("Posts"));
        assert!(!DatabaseManager::is_valid_identifier("1posts"));
        assert!(!DatabaseManager::is_valid_identifier("posts; DROP TABLE users"));
    }

    #[test]
    fn extracts_field_from_constraint_name() {
        assert_eq!(field_from_constraint("users_email_key").as_deref(), Some("email"));
        assert_eq!(field_from_constraint("users_username_key").as_deref(), Some("username"));
        assert_eq!(field_from_constraint("permissions_name_key").as_deref(), Some("name"));
        assert_eq!(field_from_constraint("categories_slug_key").as_deref(), Some("slug"));
    }

    #[test]
    fn primary_keys_and_foreign_names_have_no_field() {
        assert_eq!(field_from_constraint("user_roles_pkey"), None);
        assert_eq!(field_from_constraint("something_else_key"), None);
    }

    #[test]
    fn violated_field_only_for_unique_violations() {
        let err = DatabaseError::UniqueViolation {
            constraint: Some("posts_slug_key".to_string()),
        };
        assert_eq!(err.violated_field().as_deref(), Some("slug"));
        assert_eq!(DatabaseError::NotFound("x".into()).violated_field(), None);
    }
}
