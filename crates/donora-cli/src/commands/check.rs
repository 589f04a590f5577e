use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use donora_auth::{Actor, Resolution, SessionState, resolve_named};

/// Evaluate one module/action pair for a role, either against the role's
/// stored permissions or against an explicit permission list.
pub async fn run(
    base_dir: &Path,
    role: &str,
    permissions: Vec<String>,
    module: &str,
    action: &str,
) -> Result<()> {
    let permissions = if permissions.is_empty() {
        let (_config, store) = super::open_store(base_dir).await?;
        match store.get_role_by_name(role).await {
            Ok(r) => store
                .list_role_permissions(&r.id)
                .await?
                .into_iter()
                .map(|p| p.name)
                .collect(),
            Err(donora_auth::AuthError::NotFound(_)) => {
                tracing::warn!(role, "role not found, checking with no permissions");
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        }
    } else {
        permissions
    };

    let actor = Actor::new(role, permissions);
    let level = actor.level();
    let state = SessionState::Ready(Arc::new(actor));

    match resolve_named(&state, module, action) {
        Resolution::Allowed => println!("ALLOW  {role} ({level}) {module}_{action}"),
        Resolution::Loading => println!("LOADING"),
        Resolution::Denied(reason) => {
            println!("DENY   {role} ({level}) {module}_{action}: {reason:?}")
        }
    }

    Ok(())
}
