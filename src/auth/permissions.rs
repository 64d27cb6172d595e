//! Capability names and effective permission sets.
//!
//! Every protected route names exactly one of these constants. Names follow
//! `<resource>-<action>`.

use std::collections::{BTreeMap, BTreeSet};

use super::principal::RoleGrant;

pub const DASHBOARD_INDEX: &str = "dashboard-index";

pub const CATEGORIES_INDEX: &str = "categories-index";
pub const CATEGORIES_CREATE: &str = "categories-create";
pub const CATEGORIES_SHOW: &str = "categories-show";
pub const CATEGORIES_UPDATE: &str = "categories-update";
pub const CATEGORIES_DELETE: &str = "categories-delete";

pub const POSTS_INDEX: &str = "posts-index";
pub const POSTS_CREATE: &str = "posts-create";
pub const POSTS_SHOW: &str = "posts-show";
pub const POSTS_UPDATE: &str = "posts-update";
pub const POSTS_DELETE: &str = "posts-delete";

pub const PAGES_INDEX: &str = "pages-index";
pub const PAGES_CREATE: &str = "pages-create";
pub const PAGES_SHOW: &str = "pages-show";
pub const PAGES_UPDATE: &str = "pages-update";
pub const PAGES_DELETE: &str = "pages-delete";

pub const PHOTOS_INDEX: &str = "photos-index";
pub const PHOTOS_CREATE: &str = "photos-create";
pub const PHOTOS_DELETE: &str = "photos-delete";

pub const SLIDERS_INDEX: &str = "sliders-index";
pub const SLIDERS_CREATE: &str = "sliders-create";
pub const SLIDERS_DELETE: &str = "sliders-delete";

pub const PRODUCTS_INDEX: &str = "products-index";
pub const PRODUCTS_CREATE: &str = "products-create";
pub const PRODUCTS_SHOW: &str = "products-show";
pub const PRODUCTS_UPDATE: &str = "products-update";
pub const PRODUCTS_DELETE: &str = "products-delete";

pub const APARATURS_INDEX: &str = "aparaturs-index";
pub const APARATURS_CREATE: &str = "aparaturs-create";
pub const APARATURS_SHOW: &str = "aparaturs-show";
pub const APARATURS_UPDATE: &str = "aparaturs-update";
pub const APARATURS_DELETE: &str = "aparaturs-delete";

pub const USERS_INDEX: &str = "users-index";
pub const USERS_CREATE: &str = "users-create";
pub const USERS_SHOW: &str = "users-show";
pub const USERS_UPDATE: &str = "users-update";
pub const USERS_DELETE: &str = "users-delete";

pub const ROLES_INDEX: &str = "roles-index";
pub const ROLES_CREATE: &str = "roles-create";
pub const ROLES_SHOW: &str = "roles-show";
pub const ROLES_UPDATE: &str = "roles-update";
pub const ROLES_DELETE: &str = "roles-delete";

pub const PERMISSIONS_INDEX: &str = "permissions-index";
pub const PERMISSIONS_CREATE: &str = "permissions-create";
pub const PERMISSIONS_SHOW: &str = "permissions-show";
pub const PERMISSIONS_UPDATE: &str = "permissions-update";
pub const PERMISSIONS_DELETE: &str = "permissions-delete";

/// Every capability, used by the seeder
pub const ALL: &[&str] = &[
    DASHBOARD_INDEX,
    CATEGORIES_INDEX,
    CATEGORIES_CREATE,
    CATEGORIES_SHOW,
    CATEGORIES_UPDATE,
    CATEGORIES_DELETE,
    POSTS_INDEX,
    POSTS_CREATE,
    POSTS_SHOW,
    POSTS_UPDATE,
    POSTS_DELETE,
    PAGES_INDEX,
    PAGES_CREATE,
    PAGES_SHOW,
    PAGES_UPDATE,
    PAGES_DELETE,
    PHOTOS_INDEX,
    PHOTOS_CREATE,
    PHOTOS_DELETE,
    SLIDERS_INDEX,
    SLIDERS_CREATE,
    SLIDERS_DELETE,
    PRODUCTS_INDEX,
    PRODUCTS_CREATE,
    PRODUCTS_SHOW,
    PRODUCTS_UPDATE,
    PRODUCTS_DELETE,
    APARATURS_INDEX,
    APARATURS_CREATE,
    APARATURS_SHOW,
    APARATURS_UPDATE,
    APARATURS_DELETE,
    USERS_INDEX,
    USERS_CREATE,
    USERS_SHOW,
    USERS_UPDATE,
    USERS_DELETE,
    ROLES_INDEX,
    ROLES_CREATE,
    ROLES_SHOW,
    ROLES_UPDATE,
    ROLES_DELETE,
    PERMISSIONS_INDEX,
    PERMISSIONS_CREATE,
    PERMISSIONS_SHOW,
    PERMISSIONS_UPDATE,
    PERMISSIONS_DELETE,
];

/// Read-only capabilities granted to the seeded `user` role
pub const VIEW_ONLY: &[&str] = &[POSTS_INDEX, PHOTOS_INDEX, SLIDERS_INDEX, PAGES_INDEX];

/// Union of permission names across a user's roles
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet(BTreeSet<String>);

impl PermissionSet {
    pub fn from_roles(roles: &[RoleGrant]) -> Self {
        PermissionSet(
            roles
                .iter()
                .flat_map(|role| role.permissions.iter().cloned())
                .collect(),
        )
    }

    pub fn contains(&self, permission: &str) -> bool {
        self.0.contains(permission)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// `permission-name -> true`, the shape returned on login
    pub fn to_map(&self) -> BTreeMap<String, bool> {
        self.0.iter().map(|name| (name.clone(), true)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(name: &str, permissions: &[&str]) -> RoleGrant {
        RoleGrant {
            id: 0,
            name: name.to_string(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn union_collapses_duplicates() {
        let set = PermissionSet::from_roles(&[role("R1", &["a", "b"]), role("R2", &["b", "c"])]);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn no_roles_means_no_permissions() {
        let set = PermissionSet::from_roles(&[]);
        assert!(set.is_empty());
        assert!(!set.contains(POSTS_INDEX));

        let empty_role = PermissionSet::from_roles(&[role("empty", &[])]);
        assert!(empty_role.is_empty());
    }

    #[test]
    fn map_marks_every_permission_true() {
        let set = PermissionSet::from_roles(&[role("editor", &[POSTS_INDEX, POSTS_CREATE])]);
        let map = set.to_map();
        assert_eq!(map.len(), 2);
        assert!(map.values().all(|granted| *granted));
    }

    #[test]
    fn permission_names_are_unique() {
        let unique: BTreeSet<&str> = ALL.iter().copied().collect();
        assert_eq!(unique.len(), ALL.len());
        assert!(VIEW_ONLY.iter().all(|p| ALL.contains(p)));
    }
}
