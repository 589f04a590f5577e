use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::permissions::PermissionKey;
use crate::roles::{RoleLevel, role_level};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub role_id: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
    pub description: String,
    pub is_system: bool,
    pub created_at: String,
}

impl Role {
    /// Derived from `name` on every call, never stored.
    pub fn level(&self) -> RoleLevel {
        role_level(&self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permission {
    pub id: String,
    pub name: String,
    pub description: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: i64,
    pub user_id: Option<String>,
    pub action: String,
    pub target: Option<String>,
    pub ip_addr: Option<String>,
    pub created_at: String,
}

/// The signed-in admin as seen by authorization checks: a role name and the
/// permission names attached to that role when the profile was fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub role: String,
    pub permissions: HashSet<String>,
}

impl Actor {
    pub fn new<I, S>(role: impl Into<String>, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            role: role.into(),
            permissions: permissions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn level(&self) -> RoleLevel {
        role_level(&self.role)
    }

    pub fn holds(&self, key: PermissionKey) -> bool {
        self.permissions.contains(&key.to_string())
    }

    /// Copy of this actor with one more permission name.
    pub fn with_permission(&self, name: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.permissions.insert(name.into());
        next
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub role_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AssignRoleRequest {
    pub role_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateRoleRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RolePermissionRequest {
    pub permission_id: String,
}
