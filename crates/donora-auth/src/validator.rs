use serde::Serialize;
use std::fmt;

use crate::roles::{RoleLevel, is_protected, role_level};

/// A mutating operation against a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleOperation {
    Create,
    Edit,
    Delete,
    /// Attach the role to an admin account.
    Assign,
}

impl fmt::Display for RoleOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RoleOperation::Create => "create",
            RoleOperation::Edit => "edit",
            RoleOperation::Delete => "delete",
            RoleOperation::Assign => "assign",
        };
        f.write_str(s)
    }
}

/// Outcome of a role operation check. `message` is empty when valid and is
/// meant to be rendered inline otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub valid: bool,
    pub message: String,
}

impl Validation {
    pub fn ok() -> Self {
        Self {
            valid: true,
            message: String::new(),
        }
    }

    pub fn reject(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
        }
    }
}

/// Decide whether an actor holding `actor_role` may perform `op` on the role
/// named `target`. Fails closed when the actor's role is missing.
pub fn validate_role_operation(
    actor_role: Option<&str>,
    op: RoleOperation,
    target: &str,
) -> Validation {
    let actor_level = match actor_role {
        Some(name) if !name.trim().is_empty() => role_level(name),
        _ => return Validation::reject("unable to resolve your role"),
    };

    if actor_level == RoleLevel::Other {
        return Validation::reject(format!(
            "your role does not allow you to {op} roles"
        ));
    }

    if op == RoleOperation::Create && target.trim().is_empty() {
        return Validation::reject("role name is required");
    }

    if is_protected(target) && actor_level != RoleLevel::SuperAdmin {
        return Validation::reject(format!(
            "'{target}' is a protected role and can only be modified by a Super Admin"
        ));
    }

    Validation::ok()
}

pub fn validate_create(actor_role: Option<&str>, target: &str) -> Validation {
    validate_role_operation(actor_role, RoleOperation::Create, target)
}

pub fn validate_edit(actor_role: Option<&str>, target: &str) -> Validation {
    validate_role_operation(actor_role, RoleOperation::Edit, target)
}

pub fn validate_delete(actor_role: Option<&str>, target: &str) -> Validation {
    validate_role_operation(actor_role, RoleOperation::Delete, target)
}

pub fn validate_assign(actor_role: Option<&str>, target: &str) -> Validation {
    validate_role_operation(actor_role, RoleOperation::Assign, target)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MUTATIONS: [RoleOperation; 4] = [
        RoleOperation::Create,
        RoleOperation::Edit,
        RoleOperation::Delete,
        RoleOperation::Assign,
    ];

    #[test]
    fn admin_may_manage_custom_roles() {
        for op in MUTATIONS {
            assert_eq!(
                validate_role_operation(Some("Admin"), op, "Editor"),
                Validation::ok()
            );
        }
    }

    #[test]
    fn admin_cannot_edit_super_admin() {
        let v = validate_edit(Some("Admin"), "Super Admin");
        assert!(!v.valid);
        assert!(v.message.contains("protected"));
        assert!(v.message.contains("Super Admin"));
    }

    #[test]
    fn admin_cannot_create_protected_names() {
        assert!(!validate_create(Some("Admin"), "Admin").valid);
        assert!(!validate_create(Some("Admin"), "Super Admin").valid);
    }

    #[test]
    fn super_admin_may_touch_protected_roles() {
        for op in MUTATIONS {
            assert!(validate_role_operation(Some("Super Admin"), op, "Admin").valid);
            assert!(validate_role_operation(Some("Super Admin"), op, "Super Admin").valid);
        }
    }

    #[test]
    fn other_level_cannot_mutate_any_role() {
        for actor in ["Editor", "Volunteer", "admin"] {
            for op in MUTATIONS {
                for target in ["Admin", "Super Admin", "Editor"] {
                    let v = validate_role_operation(Some(actor), op, target);
                    assert!(!v.valid, "{actor} {op} {target}");
                }
            }
        }
    }

    #[test]
    fn unresolvable_actor_fails_closed() {
        assert!(!validate_delete(None, "Editor").valid);
        assert!(!validate_delete(Some(""), "Editor").valid);
        assert!(!validate_assign(Some("   "), "Editor").valid);
    }

    #[test]
    fn create_requires_a_name() {
        let v = validate_create(Some("Super Admin"), "  ");
        assert_eq!(v.message, "role name is required");
    }

    #[test]
    fn protection_is_case_sensitive() {
        // "admin" is an ordinary custom role name.
        assert!(validate_create(Some("Admin"), "admin").valid);
    }
}
