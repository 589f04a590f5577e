use serde::Serialize;

use crate::permissions::{Action, Module, PermissionKey, UnknownPermission};
use crate::roles::RoleLevel;
use crate::session::SessionState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum DenyReason {
    /// Actor lacks the permission string.
    MissingPermission(PermissionKey),
    /// No profile is available: the fetch failed or nobody is signed in.
    NoPermissionsKnown,
    /// The module or action name is not part of the catalog.
    Unconfigured(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum Resolution {
    Loading,
    Allowed,
    Denied(DenyReason),
}

impl Resolution {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Resolution::Allowed)
    }
}

/// Can the session's actor perform `action` on `module`?
///
/// Super Admins pass every check. Everyone else needs `<module>_<action>` in
/// their permission set.
pub fn resolve(state: &SessionState, module: Module, action: Action) -> Resolution {
    let actor = match state {
        SessionState::Loading => return Resolution::Loading,
        SessionState::Failed(_) | SessionState::SignedOut => {
            return Resolution::Denied(DenyReason::NoPermissionsKnown);
        }
        SessionState::Ready(actor) => actor,
    };

    if actor.level() == RoleLevel::SuperAdmin {
        return Resolution::Allowed;
    }

    let key = PermissionKey::new(module, action);
    if actor.holds(key) {
        Resolution::Allowed
    } else {
        tracing::debug!(role = %actor.role, permission = %key, "permission denied");
        Resolution::Denied(DenyReason::MissingPermission(key))
    }
}

/// String entry point. Names outside the catalog are denied and logged as a
/// configuration gap.
pub fn resolve_named(state: &SessionState, module: &str, action: &str) -> Resolution {
    let parsed: Result<(Module, Action), UnknownPermission> =
        module.parse().and_then(|m| Ok((m, action.parse()?)));
    match parsed {
        Ok((m, a)) => resolve(state, m, a),
        Err(e) => {
            tracing::warn!(module, action, "authorization query for {e}");
            Resolution::Denied(DenyReason::Unconfigured(e.to_string()))
        }
    }
}
