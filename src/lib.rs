pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;

use axum::extract::FromRef;
use sqlx::{postgres::PgRow, FromRow, PgPool};
use std::path::PathBuf;
use std::sync::Arc;

use crate::api::{PageParams, PageQuery, UploadPolicy};
use crate::auth::{PgPrincipalStore, PrincipalStore, TokenError, TokenService};
use crate::config::AppConfig;
use crate::database::Repository;
use crate::error::ApiError;

/// Shared handler state. Everything configurable is injected here at startup.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
    pub tokens: Arc<TokenService>,
    pub principals: Arc<dyn PrincipalStore>,
}

impl AppState {
    /// State backed by Postgres for both content and principals
    pub fn new(pool: PgPool, config: AppConfig) -> Result<Self, TokenError> {
        let principals: Arc<dyn PrincipalStore> = Arc::new(PgPrincipalStore::new(pool.clone()));
        Self::with_principals(pool, config, principals)
    }

    /// State with a caller-supplied principal source
    pub fn with_principals(
        pool: PgPool,
        config: AppConfig,
        principals: Arc<dyn PrincipalStore>,
    ) -> Result<Self, TokenError> {
        let ttl = chrono::Duration::hours(config.security.jwt_expiry_hours as i64);
        let tokens = TokenService::new(&config.security.jwt_secret, ttl)?;

        Ok(Self {
            pool,
            config: Arc::new(config),
            tokens: Arc::new(tokens),
            principals,
        })
    }

    pub fn repo<T>(&self, table: &'static str) -> Result<Repository<T>, ApiError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        Ok(Repository::new(table, self.pool.clone())?)
    }

    /// Image policy for uploads stored under `<upload root>/<dir>`
    pub fn uploads(&self, dir: &str) -> UploadPolicy {
        UploadPolicy::images(self.upload_root().join(dir), self.config.uploads.max_size_bytes)
    }

    pub fn upload_root(&self) -> PathBuf {
        PathBuf::from(&self.config.uploads.root)
    }

    pub fn page_params(&self, query: &PageQuery) -> PageParams {
        PageParams::from_query(query, self.config.api.pagination_max_limit)
    }
}

impl FromRef<AppState> for Arc<TokenService> {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

impl FromRef<AppState> for Arc<dyn PrincipalStore> {
    fn from_ref(state: &AppState) -> Self {
        state.principals.clone()
    }
}
