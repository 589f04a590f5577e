use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AuthError;
use crate::gate::GateDecision;
use crate::jwt::{AuthClaims, verify_jwt};
use crate::permissions::{Action, Module};
use crate::profile::Profile;
use crate::resolver::resolve;
use crate::session::SessionState;
use crate::store::AuthStore;
use crate::types::Actor;

/// Admin authenticated by a bearer session token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub username: String,
    pub role: String,
    pub permissions: Vec<String>,
}

impl AuthUser {
    pub fn actor(&self) -> Actor {
        Actor::new(self.role.clone(), self.permissions.iter().cloned())
    }

    pub fn session_state(&self) -> SessionState {
        SessionState::Ready(Arc::new(self.actor()))
    }
}

impl AuthUser {
    /// Combine verified token claims with the admin's current profile.
    pub fn from_profile(claims: AuthClaims, profile: Profile) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username,
            role: profile.role,
            permissions: profile.permissions,
        }
    }
}

/// Request extension consumed by the [`AuthUser`] extractor.
#[derive(Clone)]
pub struct AuthState {
    pub jwt_secret: String,
    pub auth_store: Arc<dyn AuthStore>,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = parts
            .extensions
            .get::<AuthState>()
            .ok_or(AuthError::Internal("auth not configured".into()))?
            .clone();

        let bearer = parts
            .headers
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .ok_or(AuthError::Unauthorized)?;

        let claims: AuthClaims = verify_jwt(bearer, &auth_state.jwt_secret)?;

        // Role and grants are read per request; the token only proves identity.
        let profile = match auth_state.auth_store.get_user_profile(&claims.sub).await {
            Ok(profile) => profile,
            Err(AuthError::NotFound(_) | AuthError::Forbidden(_)) => {
                return Err(AuthError::Unauthorized);
            }
            Err(e) => return Err(e),
        };
        Ok(AuthUser::from_profile(claims, profile))
    }
}

/// Reject the request unless the caller may perform `action` on `module`.
pub fn require(user: &AuthUser, module: Module, action: Action) -> Result<(), AuthError> {
    let decision = GateDecision::from(&resolve(&user.session_state(), module, action));
    if decision.allowed {
        return Ok(());
    }
    Err(AuthError::Forbidden(
        decision.reason.unwrap_or_else(|| "not allowed".into()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: &str, perms: &[&str]) -> AuthUser {
        AuthUser {
            user_id: "u1".into(),
            username: "alice".into(),
            role: role.into(),
            permissions: perms.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn require_passes_with_permission() {
        assert!(require(&user("Editor", &["faqs_edit"]), Module::Faqs, Action::Edit).is_ok());
    }

    #[test]
    fn require_names_missing_permission() {
        let err = require(&user("Editor", &[]), Module::Faqs, Action::Edit).unwrap_err();
        assert_eq!(err.to_string(), "forbidden: missing permission: faqs_edit");
    }

    #[test]
    fn denial_message_matches_gate_reason() {
        let user = user("", &[]);
        let err = require(&user, Module::Roles, Action::Create).unwrap_err();
        let decision = crate::gate::gate(&user.session_state(), Module::Roles, Action::Create);
        assert_eq!(err.to_string(), format!("forbidden: {}", decision.reason.unwrap()));
        assert!(!err.to_string().contains("Denied"));
    }

    #[test]
    fn super_admin_needs_no_grants() {
        assert!(require(&user("Super Admin", &[]), Module::Roles, Action::Delete).is_ok());
    }
}
