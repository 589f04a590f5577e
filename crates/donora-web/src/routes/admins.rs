use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};

use donora_auth::error::AuthError;
use donora_auth::{
    Action, AssignRoleRequest, AuthUser, CreateUserRequest, Module, RoleOperation, User,
    hash_password, require, validate_role_operation,
};

use crate::models::AdminResponse;
use crate::state::AppState;

async fn admin_to_response(state: &AppState, user: User) -> Result<AdminResponse, AuthError> {
    let role = current_role_name(state, &user).await?;
    Ok(AdminResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        role,
        is_active: user.is_active,
        created_at: user.created_at,
        updated_at: user.updated_at,
    })
}

/// Moving an admin into or out of a role counts as assigning that role.
fn check_assign(user: &AuthUser, role_name: &str) -> Result<(), AuthError> {
    let validation = validate_role_operation(Some(&user.role), RoleOperation::Assign, role_name);
    if validation.valid {
        Ok(())
    } else {
        Err(AuthError::Validation(validation.message))
    }
}

async fn current_role_name(state: &AppState, user: &User) -> Result<Option<String>, AuthError> {
    match user.role_id {
        Some(ref id) => Ok(Some(state.auth_store.get_role(id).await?.name)),
        None => Ok(None),
    }
}

pub async fn list_admins(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AdminResponse>>, AuthError> {
    require(&auth_user, Module::Admins, Action::View)?;

    let users = state.auth_store.list_users().await?;
    let mut result = Vec::with_capacity(users.len());
    for u in users {
        result.push(admin_to_response(&state, u).await?);
    }
    Ok(Json(result))
}

pub async fn create_admin(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<AdminResponse>, AuthError> {
    require(&auth_user, Module::Admins, Action::Create)?;

    if req.username.trim().is_empty() {
        return Err(AuthError::InvalidInput("username required".into()));
    }
    if let Some(ref role_id) = req.role_id {
        let role = state.auth_store.get_role(role_id).await?;
        check_assign(&auth_user, &role.name)?;
    }

    let hash = hash_password(&req.password)?;
    let user = state
        .auth_store
        .create_user(
            req.username.trim(),
            &hash,
            req.email.as_deref(),
            req.role_id.as_deref(),
        )
        .await?;

    state.audit(&auth_user.user_id, "admin.create", &user.username).await;

    Ok(Json(admin_to_response(&state, user).await?))
}

pub async fn assign_role(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<AssignRoleRequest>,
) -> Result<Json<AdminResponse>, AuthError> {
    require(&auth_user, Module::Admins, Action::Edit)?;

    let target = state.auth_store.get_user_by_id(&id).await?;
    if let Some(current) = current_role_name(&state, &target).await? {
        check_assign(&auth_user, &current)?;
    }
    let role = state.auth_store.get_role(&req.role_id).await?;
    check_assign(&auth_user, &role.name)?;

    let user = state.auth_store.set_user_role(&id, &role.id).await?;

    state
        .audit(
            &auth_user.user_id,
            "admin.role.assign",
            &format!("{}:{}", user.username, role.name),
        )
        .await;

    Ok(Json(admin_to_response(&state, user).await?))
}

pub async fn delete_admin(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AuthError> {
    require(&auth_user, Module::Admins, Action::Delete)?;

    if id == auth_user.user_id {
        return Err(AuthError::InvalidInput("cannot delete your own account".into()));
    }
    let target = state.auth_store.get_user_by_id(&id).await?;
    if let Some(current) = current_role_name(&state, &target).await? {
        check_assign(&auth_user, &current)?;
    }
    state.auth_store.delete_user(&id).await?;

    state.audit(&auth_user.user_id, "admin.delete", &target.username).await;

    Ok(Json(serde_json::json!({"ok": true})))
}
