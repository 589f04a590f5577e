pub mod admins;
pub mod audit;
pub mod auth;
pub mod permissions;
pub mod profile;
pub mod roles;

use std::sync::Arc;

use axum::routing::{delete, get, post, put};
use axum::{Extension, Router};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    let auth_state = state.auth_state();

    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/profile", get(profile::get_profile))
        .route("/api/gate", get(profile::get_gate))
        .route("/api/roles", get(roles::list_roles).post(roles::create_role))
        .route(
            "/api/roles/{id}",
            get(roles::get_role)
                .put(roles::update_role)
                .delete(roles::delete_role),
        )
        .route(
            "/api/roles/{id}/permissions",
            get(roles::list_role_permissions).post(roles::add_role_permission),
        )
        .route(
            "/api/roles/{id}/permissions/{permission_id}",
            delete(roles::remove_role_permission),
        )
        .route("/api/permissions", get(permissions::list_permissions))
        .route("/api/admins", get(admins::list_admins).post(admins::create_admin))
        .route("/api/admins/{id}", delete(admins::delete_admin))
        .route("/api/admins/{id}/role", put(admins::assign_role))
        .route("/api/audit", get(audit::list_audit))
        .layer(Extension(auth_state))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
