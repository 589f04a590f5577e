use axum::Json;
use axum::extract::Query;

use donora_auth::{AuthUser, GateDecision, Profile, resolve_named};

use crate::models::GateQuery;

/// Current role and permission names. [`AuthUser`] is built from the live
/// store profile, so a client refresh picks up grants made after login.
pub async fn get_profile(auth_user: AuthUser) -> Json<Profile> {
    Json(Profile {
        role: auth_user.role,
        permissions: auth_user.permissions,
    })
}

/// Gate decision for one module/action pair, from the same profile the
/// route guards check.
pub async fn get_gate(
    auth_user: AuthUser,
    Query(query): Query<GateQuery>,
) -> Json<GateDecision> {
    let resolution = resolve_named(&auth_user.session_state(), &query.module, &query.action);
    Json(GateDecision::from(&resolution))
}
