use serde::{Deserialize, Serialize};
use std::fmt;

pub const SUPER_ADMIN: &str = "Super Admin";
pub const ADMIN: &str = "Admin";

/// Seed roles that only a Super Admin may mutate.
pub const PROTECTED_ROLES: &[&str] = &[SUPER_ADMIN, ADMIN];

/// Ordinal privilege level of a role. Ordering is `Other < Admin < SuperAdmin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleLevel {
    Other,
    Admin,
    SuperAdmin,
}

impl fmt::Display for RoleLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoleLevel::Other => write!(f, "other"),
            RoleLevel::Admin => write!(f, "admin"),
            RoleLevel::SuperAdmin => write!(f, "super_admin"),
        }
    }
}

/// Level for a role name. Exact, case-sensitive match; anything unknown is `Other`.
pub fn role_level(name: &str) -> RoleLevel {
    match name {
        SUPER_ADMIN => RoleLevel::SuperAdmin,
        ADMIN => RoleLevel::Admin,
        _ => RoleLevel::Other,
    }
}

pub fn is_protected(name: &str) -> bool {
    PROTECTED_ROLES.contains(&name)
}
