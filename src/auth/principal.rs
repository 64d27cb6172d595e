//! Resolution of a username into the user plus its roles and permissions.

use async_trait::async_trait;
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use super::permissions::PermissionSet;
use crate::database::DatabaseError;

/// A role and the permission names it grants
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleGrant {
    pub id: i64,
    pub name: String,
    pub permissions: Vec<String>,
}

/// The authenticated user as seen by the authorization layer
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub roles: Vec<RoleGrant>,
}

impl Principal {
    pub fn permission_set(&self) -> PermissionSet {
        PermissionSet::from_roles(&self.roles)
    }
}

/// Source of principals for login and per-request permission checks
#[async_trait]
pub trait PrincipalStore: Send + Sync {
    async fn find_principal(&self, username: &str) -> Result<Option<Principal>, DatabaseError>;
}

#[derive(FromRow)]
struct UserRow {
    id: i64,
    name: String,
    username: String,
    email: String,
    password: String,
}

#[derive(FromRow)]
struct GrantRow {
    role_id: i64,
    role_name: String,
    permission: Option<String>,
}

/// Postgres-backed store: one query for the user row, one for the
/// role/permission join.
#[derive(Clone)]
pub struct PgPrincipalStore {
    pool: PgPool,
}

impl PgPrincipalStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PrincipalStore for PgPrincipalStore {
    async fn find_principal(&self, username: &str) -> Result<Option<Principal>, DatabaseError> {
        let user = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, username, email, password FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        let Some(user) = user else {
            return Ok(None);
        };

        let rows = sqlx::query_as::<_, GrantRow>(
            r#"
            SELECT r.id AS role_id, r.name AS role_name, p.name AS permission
            FROM user_roles ur
            JOIN roles r ON r.id = ur.role_id
            LEFT JOIN role_permissions rp ON rp.role_id = r.id
            LEFT JOIN permissions p ON p.id = rp.permission_id
            WHERE ur.user_id = $1
            ORDER BY r.id, p.name
            "#,
        )
        .bind(user.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(Principal {
            id: user.id,
            name: user.name,
            username: user.username,
            email: user.email,
            password_hash: user.password,
            roles: group_grants(rows),
        }))
    }
}

/// Fold join rows (ordered by role) into one grant per role
fn group_grants(rows: Vec<GrantRow>) -> Vec<RoleGrant> {
    let mut roles: Vec<RoleGrant> = Vec::new();

    for row in rows {
        let same_role = roles.last().is_some_and(|r| r.id == row.role_id);
        if !same_role {
            roles.push(RoleGrant {
                id: row.role_id,
                name: row.role_name,
                permissions: Vec::new(),
            });
        }
        if let (Some(permission), Some(role)) = (row.permission, roles.last_mut()) {
            role.permissions.push(permission);
        }
    }

    roles
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(role_id: i64, role_name: &str, permission: Option<&str>) -> GrantRow {
        GrantRow {
            role_id,
            role_name: role_name.to_string(),
            permission: permission.map(str::to_string),
        }
    }

    #[test]
    fn groups_rows_by_role() {
        let roles = group_grants(vec![
            row(1, "admin", Some("posts-index")),
            row(1, "admin", Some("posts-create")),
            row(2, "empty", None),
            row(3, "user", Some("posts-index")),
        ]);

        assert_eq!(roles.len(), 3);
        assert_eq!(roles[0].permissions, vec!["posts-index", "posts-create"]);
        assert!(roles[1].permissions.is_empty());
        assert_eq!(roles[2].name, "user");
    }

    #[test]
    fn principal_set_is_union_of_roles() {
        let principal = Principal {
            id: 1,
            name: "Admin".into(),
            username: "admin".into(),
            email: "admin@example.com".into(),
            password_hash: String::new(),
            roles: group_grants(vec![
                row(1, "R1", Some("a")),
                row(1, "R1", Some("b")),
                row(2, "R2", Some("b")),
                row(2, "R2", Some("c")),
            ]),
        };

        let set = principal.permission_set();
        assert_eq!(set.len(), 3);
        assert!(set.contains("a") && set.contains("c"));
    }
}
