use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};

use donora_auth::error::AuthError;
use donora_auth::{
    Action, AuthUser, CreateRoleRequest, Module, Role, RoleOperation, RolePermissionRequest,
    UpdateRoleRequest, require, validate_role_operation,
};

use crate::models::{PermissionResponse, RoleResponse};
use crate::state::AppState;

/// Protected-role rules for role management screens. Runs after the module
/// permission check and before any store call.
fn check_operation(user: &AuthUser, op: RoleOperation, target: &str) -> Result<(), AuthError> {
    let validation = validate_role_operation(Some(&user.role), op, target);
    if validation.valid {
        Ok(())
    } else {
        tracing::debug!(actor = %user.username, %op, role = target, "role operation rejected");
        Err(AuthError::Validation(validation.message))
    }
}

async fn role_to_response(state: &AppState, role: Role) -> Result<RoleResponse, AuthError> {
    let perms = state.auth_store.list_role_permissions(&role.id).await?;
    Ok(RoleResponse::new(role, perms))
}

pub async fn list_roles(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<RoleResponse>>, AuthError> {
    require(&auth_user, Module::Roles, Action::View)?;

    let roles = state.auth_store.list_roles().await?;
    let mut result = Vec::with_capacity(roles.len());
    for r in roles {
        result.push(role_to_response(&state, r).await?);
    }
    Ok(Json(result))
}

pub async fn get_role(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<RoleResponse>, AuthError> {
    require(&auth_user, Module::Roles, Action::View)?;

    let role = state.auth_store.get_role(&id).await?;
    Ok(Json(role_to_response(&state, role).await?))
}

pub async fn create_role(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateRoleRequest>,
) -> Result<Json<RoleResponse>, AuthError> {
    require(&auth_user, Module::Roles, Action::Create)?;
    let name = req.name.trim();
    check_operation(&auth_user, RoleOperation::Create, name)?;

    let role = state
        .auth_store
        .create_role(name, req.description.as_deref().unwrap_or(""), false)
        .await?;

    state.audit(&auth_user.user_id, "role.create", &role.name).await;

    Ok(Json(role_to_response(&state, role).await?))
}

pub async fn update_role(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<Json<RoleResponse>, AuthError> {
    require(&auth_user, Module::Roles, Action::Edit)?;

    let current = state.auth_store.get_role(&id).await?;
    check_operation(&auth_user, RoleOperation::Edit, &current.name)?;
    if let Some(ref name) = req.name {
        if name.trim().is_empty() {
            return Err(AuthError::InvalidInput("role name required".into()));
        }
        check_operation(&auth_user, RoleOperation::Edit, name)?;
    }

    let role = state.auth_store.update_role(&id, &req).await?;

    state.audit(&auth_user.user_id, "role.update", &role.name).await;

    Ok(Json(role_to_response(&state, role).await?))
}

pub async fn delete_role(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AuthError> {
    require(&auth_user, Module::Roles, Action::Delete)?;

    let role = state.auth_store.get_role(&id).await?;
    check_operation(&auth_user, RoleOperation::Delete, &role.name)?;
    state.auth_store.delete_role(&id).await?;

    state.audit(&auth_user.user_id, "role.delete", &role.name).await;

    Ok(Json(serde_json::json!({"ok": true})))
}

pub async fn list_role_permissions(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<PermissionResponse>>, AuthError> {
    require(&auth_user, Module::Roles, Action::View)?;

    state.auth_store.get_role(&id).await?;
    let perms = state.auth_store.list_role_permissions(&id).await?;
    Ok(Json(perms.into_iter().map(Into::into).collect()))
}

pub async fn add_role_permission(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<RolePermissionRequest>,
) -> Result<Json<serde_json::Value>, AuthError> {
    require(&auth_user, Module::Roles, Action::Edit)?;

    let role = state.auth_store.get_role(&id).await?;
    check_operation(&auth_user, RoleOperation::Edit, &role.name)?;
    state
        .auth_store
        .add_role_permission(&id, &req.permission_id)
        .await?;

    state
        .audit(
            &auth_user.user_id,
            "role.permission.add",
            &format!("{}:{}", role.name, req.permission_id),
        )
        .await;

    Ok(Json(serde_json::json!({"ok": true})))
}

pub async fn remove_role_permission(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path((id, permission_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, AuthError> {
    require(&auth_user, Module::Roles, Action::Edit)?;

    let role = state.auth_store.get_role(&id).await?;
    check_operation(&auth_user, RoleOperation::Edit, &role.name)?;
    state
        .auth_store
        .remove_role_permission(&id, &permission_id)
        .await?;

    state
        .audit(
            &auth_user.user_id,
            "role.permission.remove",
            &format!("{}:{permission_id}", role.name),
        )
        .await;

    Ok(Json(serde_json::json!({"ok": true})))
}
