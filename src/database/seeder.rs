//! Idempotent bootstrap data: every permission, the `admin` and `user`
//! roles, and one account for each.

use sqlx::PgPool;
use tracing::info;

use super::models::{Permission, Role, User};
use super::DatabaseError;
use crate::auth::permissions;

pub struct SeedAccount {
    pub name: &'static str,
    pub username: &'static str,
    pub email: &'static str,
    pub role: &'static str,
}

pub const ADMIN_ROLE: &str = "admin";
pub const USER_ROLE: &str = "user";

pub const ACCOUNTS: &[SeedAccount] = &[
    SeedAccount {
        name: "Admin",
        username: "admin",
        email: "admin@gmail.com",
        role: ADMIN_ROLE,
    },
    SeedAccount {
        name: "User",
        username: "user",
        email: "user@gmail.com",
        role: USER_ROLE,
    },
];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub permissions: usize,
    pub roles: usize,
    pub users: usize,
}

/// Upsert permissions, roles and accounts. `password_hash` is applied to
/// every seeded account, including ones that already exist.
pub async fn seed(pool: &PgPool, password_hash: &str) -> Result<SeedReport, DatabaseError> {
    info!("Seeding {} permissions", permissions::ALL.len());
    for name in permissions::ALL {
        Permission::upsert(pool, name).await?;
    }

    Role::upsert_with_permission_names(pool, ADMIN_ROLE, permissions::ALL).await?;
    Role::upsert_with_permission_names(pool, USER_ROLE, permissions::VIEW_ONLY).await?;

    for account in ACCOUNTS {
        User::upsert_with_role_names(
            pool,
            account.name,
            account.username,
            account.email,
            password_hash,
            &[account.role],
        )
        .await?;
        info!("Seeded account {} with role {}", account.username, account.role);
    }

    Ok(SeedReport {
        permissions: permissions::ALL.len(),
        roles: 2,
        users: ACCOUNTS.len(),
    })
}
