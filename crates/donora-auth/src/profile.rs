use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::permissions::PermissionKey;
use crate::store::AuthStore;
use crate::types::Actor;

/// Role name and permission names of the signed-in admin, as returned by the
/// profile service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub role: String,
    pub permissions: Vec<String>,
}

impl Profile {
    pub fn into_actor(self) -> Actor {
        for name in &self.permissions {
            if let Err(e) = name.parse::<PermissionKey>() {
                tracing::warn!(permission = %name, role = %self.role, "profile carries {e}");
            }
        }
        Actor::new(self.role, self.permissions)
    }
}

/// Fetches the current admin's role and permissions. Implementations must be
/// safe to call repeatedly and must not rely on earlier calls.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn current_role_and_permissions(&self) -> Result<Profile, AuthError>;
}

/// Reads a profile straight from the auth store.
pub struct StoreProfileSource {
    store: Arc<dyn AuthStore>,
    user_id: String,
}

impl StoreProfileSource {
    pub fn new(store: Arc<dyn AuthStore>, user_id: impl Into<String>) -> Self {
        Self {
            store,
            user_id: user_id.into(),
        }
    }
}

#[async_trait]
impl ProfileSource for StoreProfileSource {
    async fn current_role_and_permissions(&self) -> Result<Profile, AuthError> {
        self.store.get_user_profile(&self.user_id).await
    }
}
