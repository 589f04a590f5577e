pub mod seed;
pub mod sqlite;

pub use sqlite::SqliteAuthStore;

use async_trait::async_trait;

use crate::error::AuthError;
use crate::profile::Profile;
use crate::types::*;

#[async_trait]
pub trait AuthStore: Send + Sync {
    // Admin accounts
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        email: Option<&str>,
        role_id: Option<&str>,
    ) -> Result<User, AuthError>;
    async fn get_user_by_id(&self, id: &str) -> Result<User, AuthError>;
    async fn get_user_by_username(&self, username: &str) -> Result<User, AuthError>;
    async fn list_users(&self) -> Result<Vec<User>, AuthError>;
    async fn set_user_role(&self, user_id: &str, role_id: &str) -> Result<User, AuthError>;
    async fn set_user_active(&self, user_id: &str, is_active: bool) -> Result<User, AuthError>;
    async fn delete_user(&self, id: &str) -> Result<(), AuthError>;
    async fn get_password_hash(&self, user_id: &str) -> Result<String, AuthError>;
    async fn user_count(&self) -> Result<u64, AuthError>;

    // Roles
    async fn create_role(
        &self,
        name: &str,
        description: &str,
        is_system: bool,
    ) -> Result<Role, AuthError>;
    async fn get_role(&self, id: &str) -> Result<Role, AuthError>;
    async fn get_role_by_name(&self, name: &str) -> Result<Role, AuthError>;
    async fn list_roles(&self) -> Result<Vec<Role>, AuthError>;
    async fn update_role(&self, id: &str, req: &UpdateRoleRequest) -> Result<Role, AuthError>;
    async fn delete_role(&self, id: &str) -> Result<(), AuthError>;

    // Role-Permission
    async fn add_role_permission(&self, role_id: &str, permission_id: &str)
    -> Result<(), AuthError>;
    async fn remove_role_permission(
        &self,
        role_id: &str,
        permission_id: &str,
    ) -> Result<(), AuthError>;
    async fn list_role_permissions(&self, role_id: &str) -> Result<Vec<Permission>, AuthError>;

    /// Role name and permission names of an active admin. An admin with no
    /// role gets an empty role name, which resolves to the lowest level.
    async fn get_user_profile(&self, user_id: &str) -> Result<Profile, AuthError>;

    // Permissions
    async fn list_permissions(&self) -> Result<Vec<Permission>, AuthError>;
    /// Idempotent: returns the existing row when `name` is already present.
    async fn create_permission(&self, name: &str, description: &str)
    -> Result<Permission, AuthError>;

    // Audit
    async fn log_audit(
        &self,
        user_id: Option<&str>,
        action: &str,
        target: Option<&str>,
        ip_addr: Option<&str>,
    ) -> Result<(), AuthError>;
    async fn list_audit(&self, limit: u32, offset: u32) -> Result<Vec<AuditEntry>, AuthError>;

    // Lifecycle
    async fn migrate(&self) -> Result<(), AuthError>;
    async fn seed_defaults(&self) -> Result<(), AuthError>;
}
