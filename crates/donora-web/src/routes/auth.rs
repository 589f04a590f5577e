use std::sync::Arc;

use axum::Json;
use axum::extract::State;

use donora_auth::error::AuthError;
use donora_auth::{create_jwt, verify_password};

use crate::models::{LoginRequest, LoginResponse};
use crate::state::AppState;

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthError> {
    let user = match state.auth_store.get_user_by_username(&req.username).await {
        Ok(u) => u,
        Err(AuthError::NotFound(_)) => return Err(AuthError::Unauthorized),
        Err(e) => return Err(e),
    };
    if !user.is_active {
        return Err(AuthError::Unauthorized);
    }

    let hash = state.auth_store.get_password_hash(&user.id).await?;
    if !verify_password(&req.password, &hash)? {
        tracing::debug!(username = %req.username, "login rejected");
        return Err(AuthError::Unauthorized);
    }

    let profile = state.auth_store.get_user_profile(&user.id).await?;
    let token = create_jwt(
        &user.id,
        &user.username,
        &profile,
        &state.jwt_secret,
        state.token_ttl_secs,
    )?;

    state.audit(&user.id, "auth.login", &user.username).await;

    Ok(Json(LoginResponse {
        token,
        expires_in: state.token_ttl_secs,
    }))
}
