use std::sync::Arc;

use axum::Json;
use axum::extract::State;

use donora_auth::error::AuthError;
use donora_auth::{Action, AuthUser, Module, require};

use crate::models::PermissionResponse;
use crate::state::AppState;

pub async fn list_permissions(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PermissionResponse>>, AuthError> {
    require(&auth_user, Module::Roles, Action::View)?;

    let perms = state.auth_store.list_permissions().await?;
    Ok(Json(perms.into_iter().map(Into::into).collect()))
}
