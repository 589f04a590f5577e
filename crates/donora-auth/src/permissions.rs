//! Module × action permission catalog.
//!
//! A permission string is `<module>_<action>`, e.g. `events_create`. Typed code
//! builds keys from [`Module`] and [`Action`]; strings only enter through
//! [`std::str::FromStr`] at the edges (profile payloads, HTTP queries, CLI).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Administrative resource area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Module {
    Menus,
    Events,
    Sliders,
    Faqs,
    Blogs,
    Donations,
    Receipts,
    Users,
    Settings,
    Roles,
    Admins,
    Contacts,
}

impl Module {
    pub const ALL: [Module; 12] = [
        Module::Menus,
        Module::Events,
        Module::Sliders,
        Module::Faqs,
        Module::Blogs,
        Module::Donations,
        Module::Receipts,
        Module::Users,
        Module::Settings,
        Module::Roles,
        Module::Admins,
        Module::Contacts,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Module::Menus => "menus",
            Module::Events => "events",
            Module::Sliders => "sliders",
            Module::Faqs => "faqs",
            Module::Blogs => "blogs",
            Module::Donations => "donations",
            Module::Receipts => "receipts",
            Module::Users => "users",
            Module::Settings => "settings",
            Module::Roles => "roles",
            Module::Admins => "admins",
            Module::Contacts => "contacts",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Module::Menus => "navigation menus",
            Module::Events => "charity events",
            Module::Sliders => "home page sliders",
            Module::Faqs => "FAQ entries",
            Module::Blogs => "blog posts",
            Module::Donations => "donations",
            Module::Receipts => "donation receipts",
            Module::Users => "site users",
            Module::Settings => "site settings",
            Module::Roles => "roles and their permissions",
            Module::Admins => "admin accounts",
            Module::Contacts => "contact messages",
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Module {
    type Err = UnknownPermission;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Module::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownPermission::Module(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    View,
    Create,
    Edit,
    Delete,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::View, Action::Create, Action::Edit, Action::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Create => "create",
            Action::Edit => "edit",
            Action::Delete => "delete",
        }
    }

    pub fn is_mutating(&self) -> bool {
        !matches!(self, Action::View)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = UnknownPermission;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| UnknownPermission::Action(s.to_string()))
    }
}

/// A string that does not name a known module, action or permission.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnknownPermission {
    #[error("unknown module '{0}'")]
    Module(String),
    #[error("unknown action '{0}'")]
    Action(String),
    #[error("malformed permission '{0}', expected <module>_<action>")]
    Malformed(String),
}

/// The unit of an authorization query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PermissionKey {
    pub module: Module,
    pub action: Action,
}

impl PermissionKey {
    pub const fn new(module: Module, action: Action) -> Self {
        Self { module, action }
    }

    /// Every module/action pair, module-major.
    pub fn all() -> impl Iterator<Item = PermissionKey> {
        Module::ALL
            .into_iter()
            .flat_map(|m| Action::ALL.into_iter().map(move |a| PermissionKey::new(m, a)))
    }

    pub fn description(&self) -> String {
        let verb = match self.action {
            Action::View => "View",
            Action::Create => "Create",
            Action::Edit => "Edit",
            Action::Delete => "Delete",
        };
        format!("{verb} {}", self.module.label())
    }
}

impl fmt::Display for PermissionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.module, self.action)
    }
}

impl FromStr for PermissionKey {
    type Err = UnknownPermission;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Module names carry no underscore, so split on the last one.
        let (module, action) = s
            .rsplit_once('_')
            .ok_or_else(|| UnknownPermission::Malformed(s.to_string()))?;
        Ok(PermissionKey::new(module.parse()?, action.parse()?))
    }
}

/// `(name, description)` for every permission, used to seed the store.
pub fn catalog() -> Vec<(String, String)> {
    PermissionKey::all()
        .map(|k| (k.to_string(), k.description()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_formats_as_module_underscore_action() {
        let key = PermissionKey::new(Module::Events, Action::Create);
        assert_eq!(key.to_string(), "events_create");
    }

    #[test]
    fn parse_known_key() {
        let key: PermissionKey = "sliders_delete".parse().unwrap();
        assert_eq!(key, PermissionKey::new(Module::Sliders, Action::Delete));
    }

    #[test]
    fn parse_rejects_unknowns() {
        assert_eq!(
            "widgets_view".parse::<PermissionKey>(),
            Err(UnknownPermission::Module("widgets".into()))
        );
        assert_eq!(
            "events_publish".parse::<PermissionKey>(),
            Err(UnknownPermission::Action("publish".into()))
        );
        assert_eq!(
            "events".parse::<PermissionKey>(),
            Err(UnknownPermission::Malformed("events".into()))
        );
    }

    #[test]
    fn module_names_are_case_sensitive() {
        assert!("Events".parse::<Module>().is_err());
    }

    #[test]
    fn catalog_covers_every_pair_once() {
        let names: Vec<String> = catalog().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names.len(), Module::ALL.len() * Action::ALL.len());
        let unique: std::collections::HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
        assert!(names.contains(&"contacts_view".to_string()));
    }

    #[test]
    fn description_reads_naturally() {
        let key = PermissionKey::new(Module::Receipts, Action::View);
        assert_eq!(key.description(), "View donation receipts");
    }
}
