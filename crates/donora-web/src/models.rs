use serde::{Deserialize, Serialize};

use donora_auth::{Permission, Role, RoleLevel};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: u64,
}

#[derive(Serialize)]
pub struct PermissionResponse {
    pub id: String,
    pub name: String,
    pub description: String,
}

impl From<Permission> for PermissionResponse {
    fn from(p: Permission) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
        }
    }
}

#[derive(Serialize)]
pub struct RoleResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub level: RoleLevel,
    pub is_system: bool,
    pub permissions: Vec<PermissionResponse>,
    pub created_at: String,
}

impl RoleResponse {
    pub fn new(role: Role, permissions: Vec<Permission>) -> Self {
        Self {
            level: role.level(),
            id: role.id,
            name: role.name,
            description: role.description,
            is_system: role.is_system,
            permissions: permissions.into_iter().map(Into::into).collect(),
            created_at: role.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct AdminResponse {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Deserialize)]
pub struct GateQuery {
    pub module: String,
    pub action: String,
}

#[derive(Deserialize)]
pub struct AuditQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Serialize)]
pub struct AuditResponse {
    pub id: i64,
    pub user_id: Option<String>,
    pub action: String,
    pub target: Option<String>,
    pub ip_addr: Option<String>,
    pub created_at: String,
}
