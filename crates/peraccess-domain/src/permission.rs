//! Permission names and the permission gate.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

// Catalog of permission names granted via roles. Kept as constants so route
// handlers and the seed data cannot drift apart.
pub const CREATE_USER: &str = "create_user";
pub const FIND_USER: &str = "find_user";
pub const UPDATE_USER: &str = "update_user";
pub const DELETE_USER: &str = "delete_user";

pub const CREATE_ROLE: &str = "create_role";
pub const FIND_ROLE: &str = "find_role";
pub const UPDATE_ROLE: &str = "update_role";
pub const DELETE_ROLE: &str = "delete_role";

pub const CREATE_PERMISSION: &str = "create_permission";
pub const FIND_PERMISSION: &str = "find_permission";
pub const UPDATE_PERMISSION: &str = "update_permission";
pub const DELETE_PERMISSION: &str = "delete_permission";

pub const FIND_STATISTIC: &str = "find_statistic";

/// Every seeded permission name.
pub const ALL_PERMISSIONS: [&str; 13] = [
    CREATE_USER,
    FIND_USER,
    UPDATE_USER,
    DELETE_USER,
    CREATE_ROLE,
    FIND_ROLE,
    UPDATE_ROLE,
    DELETE_ROLE,
    CREATE_PERMISSION,
    FIND_PERMISSION,
    UPDATE_PERMISSION,
    DELETE_PERMISSION,
    FIND_STATISTIC,
];

/// The flattened set of permission names a user holds through role
/// membership, resolved fresh on every request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet(HashSet<String>);

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Conjunctive gate: allow only when every required name is present.
    /// An empty resolved set always denies, even for an empty requirement.
    pub fn allows_all(&self, required: &[&str]) -> bool {
        if self.0.is_empty() {
            return false;
        }
        required.iter().all(|name| self.0.contains(*name))
    }
}

impl<S: Into<String>> FromIterator<S> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
