//! Render and dispatch gating for admin action controls.
//!
//! Every admin control asks the gate twice: when it renders, to pick a
//! [`ControlState`], and again when clicked, through [`Gate::dispatch`], which
//! re-reads the session so a permission change between render and click is
//! honoured.

use std::future::Future;

use serde::Serialize;

use crate::error::AuthError;
use crate::permissions::{Action, Module, PermissionKey};
use crate::resolver::{DenyReason, Resolution, resolve};
use crate::session::{SessionHandle, SessionState};
use crate::validator::{RoleOperation, validate_role_operation};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GateDecision {
    pub allowed: bool,
    pub reason: Option<String>,
}

impl GateDecision {
    fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ControlState {
    Enabled,
    Disabled { tooltip: String },
    Hidden,
}

impl From<&Resolution> for GateDecision {
    fn from(resolution: &Resolution) -> Self {
        match resolution {
            Resolution::Allowed => GateDecision::allow(),
            Resolution::Loading => GateDecision::deny("permissions are still loading"),
            Resolution::Denied(DenyReason::NoPermissionsKnown) => {
                GateDecision::deny("permissions could not be loaded, retry to continue")
            }
            Resolution::Denied(DenyReason::MissingPermission(key)) => {
                GateDecision::deny(format!("missing permission: {key}"))
            }
            Resolution::Denied(DenyReason::Unconfigured(detail)) => {
                GateDecision::deny(format!("not configured: {detail}"))
            }
        }
    }
}

/// Pure form of the gate for callers that already hold a session state.
pub fn gate(state: &SessionState, module: Module, action: Action) -> GateDecision {
    GateDecision::from(&resolve(state, module, action))
}

fn control_state(resolution: &Resolution, action: Action) -> ControlState {
    match resolution {
        Resolution::Allowed => ControlState::Enabled,
        Resolution::Loading => ControlState::Disabled {
            tooltip: "Loading permissions…".into(),
        },
        Resolution::Denied(DenyReason::NoPermissionsKnown) => ControlState::Disabled {
            tooltip: "Permissions could not be loaded. Retry.".into(),
        },
        Resolution::Denied(DenyReason::MissingPermission(key)) if action.is_mutating() => {
            ControlState::Disabled {
                tooltip: format!("You need the {key} permission"),
            }
        }
        Resolution::Denied(_) => ControlState::Hidden,
    }
}

/// Maps a role operation onto the module permission it needs.
fn role_operation_key(op: RoleOperation) -> PermissionKey {
    match op {
        RoleOperation::Create => PermissionKey::new(Module::Roles, Action::Create),
        RoleOperation::Edit => PermissionKey::new(Module::Roles, Action::Edit),
        RoleOperation::Delete => PermissionKey::new(Module::Roles, Action::Delete),
        RoleOperation::Assign => PermissionKey::new(Module::Admins, Action::Edit),
    }
}

#[derive(Clone)]
pub struct Gate {
    session: SessionHandle,
}

impl Gate {
    pub fn new(session: SessionHandle) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn check(&self, module: Module, action: Action) -> GateDecision {
        gate(&self.session.snapshot().state, module, action)
    }

    pub fn control_state(&self, module: Module, action: Action) -> ControlState {
        let resolution = resolve(&self.session.snapshot().state, module, action);
        control_state(&resolution, action)
    }

    /// Module permission first, then the protected-role rules.
    pub fn check_role_operation(&self, op: RoleOperation, target: &str) -> GateDecision {
        let snapshot = self.session.snapshot();
        let key = role_operation_key(op);
        let decision = gate(&snapshot.state, key.module, key.action);
        if !decision.allowed {
            return decision;
        }

        let actor_role = snapshot.actor().map(|a| a.role.as_str());
        let validation = validate_role_operation(actor_role, op, target);
        if validation.valid {
            GateDecision::allow()
        } else {
            GateDecision::deny(validation.message)
        }
    }

    /// Run `action_fut` only if the actor is allowed at this moment. The
    /// future is dropped unpolled otherwise.
    pub async fn dispatch<F, T>(
        &self,
        module: Module,
        action: Action,
        action_fut: F,
    ) -> Result<T, AuthError>
    where
        F: Future<Output = Result<T, AuthError>>,
    {
        let decision = self.check(module, action);
        if !decision.allowed {
            return Err(AuthError::Forbidden(
                decision.reason.unwrap_or_else(|| "not allowed".into()),
            ));
        }
        action_fut.await
    }
}
