use std::collections::HashMap;

use crate::error::AuthError;
use crate::permissions::{Action, Module, PermissionKey, catalog};
use crate::roles::{ADMIN, SUPER_ADMIN};
use crate::store::AuthStore;

pub const EDITOR: &str = "Editor";

/// Modules an Editor curates.
const CONTENT_MODULES: &[Module] = &[
    Module::Menus,
    Module::Events,
    Module::Sliders,
    Module::Faqs,
    Module::Blogs,
];

/// Admins get everything except removing admin accounts. Protected roles are
/// guarded by the role operation rules, not by withholding `roles_*`.
fn admin_permissions() -> Vec<PermissionKey> {
    PermissionKey::all()
        .filter(|k| *k != PermissionKey::new(Module::Admins, Action::Delete))
        .collect()
}

fn editor_permissions() -> Vec<PermissionKey> {
    CONTENT_MODULES
        .iter()
        .flat_map(|m| {
            [Action::View, Action::Create, Action::Edit]
                .into_iter()
                .map(move |a| PermissionKey::new(*m, a))
        })
        .collect()
}

/// Create the permission catalog and the seed roles. Safe to run repeatedly.
pub async fn seed_defaults(store: &dyn AuthStore) -> Result<(), AuthError> {
    let mut perm_map = HashMap::new();
    for (name, desc) in catalog() {
        let p = store.create_permission(&name, &desc).await?;
        perm_map.insert(name, p.id);
    }

    // Super Admin bypasses permission checks and needs no grants.
    let roles: [(&str, &str, Vec<PermissionKey>, bool); 3] = [
        (SUPER_ADMIN, "Unrestricted access to the back office", Vec::new(), true),
        (ADMIN, "Day-to-day administration", admin_permissions(), true),
        (EDITOR, "Maintains site content", editor_permissions(), false),
    ];

    for (name, desc, perms, is_system) in roles {
        let role = match store.get_role_by_name(name).await {
            Ok(r) => r,
            Err(AuthError::NotFound(_)) => store.create_role(name, desc, is_system).await?,
            Err(e) => return Err(e),
        };

        for key in perms {
            if let Some(pid) = perm_map.get(&key.to_string()) {
                store.add_role_permission(&role.id, pid).await?;
            }
        }
    }

    tracing::debug!(permissions = perm_map.len(), "seeded roles and permissions");
    Ok(())
}
