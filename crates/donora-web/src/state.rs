use std::sync::Arc;

use donora_auth::AuthStore;
use donora_auth::middleware::AuthState;
use donora_core::WebSettings;

pub struct AppState {
    pub auth_store: Arc<dyn AuthStore>,
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
}

impl AppState {
    pub fn new(settings: &WebSettings, auth_store: Arc<dyn AuthStore>) -> Self {
        Self {
            auth_store,
            jwt_secret: settings.jwt_secret.clone(),
            token_ttl_secs: settings.token_ttl_secs,
        }
    }

    pub fn auth_state(&self) -> AuthState {
        AuthState {
            jwt_secret: self.jwt_secret.clone(),
            auth_store: self.auth_store.clone(),
        }
    }

    /// Best-effort audit entry; a failed write never fails the request.
    pub async fn audit(&self, user_id: &str, action: &str, target: &str) {
        if let Err(e) = self
            .auth_store
            .log_audit(Some(user_id), action, Some(target), None)
            .await
        {
            tracing::warn!(action, audit_target = target, error = %e, "failed to write audit entry");
        }
    }
}
