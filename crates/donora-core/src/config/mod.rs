use crate::error::{DonoraError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level Donora configuration stored as TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonoraConfig {
    pub donora: DonoraSettings,
    #[serde(default)]
    pub web: WebSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonoraSettings {
    /// Path to the SQLite database holding admins, roles and permissions.
    pub db_path: String,
}

/// Admin API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSettings {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Lifetime of issued session tokens, in seconds.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,
    /// Bootstrap Super Admin created by `donora init`.
    #[serde(default = "default_admin_user")]
    pub admin_user: String,
    #[serde(default = "default_admin_pass")]
    pub admin_pass: String,
}

fn default_listen_addr() -> String {
    "127.0.0.1:8480".to_string()
}
fn default_jwt_secret() -> String {
    "donora-jwt-secret-change-me".to_string()
}
fn default_token_ttl() -> u64 {
    86400
}
fn default_admin_user() -> String {
    "superadmin".to_string()
}
fn default_admin_pass() -> String {
    "donora-admin".to_string()
}

impl Default for WebSettings {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            jwt_secret: default_jwt_secret(),
            token_ttl_secs: default_token_ttl(),
            admin_user: default_admin_user(),
            admin_pass: default_admin_pass(),
        }
    }
}

impl DonoraConfig {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(DonoraError::ConfigNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| DonoraError::TomlDe(e.to_string()))
    }

    /// Save config to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| DonoraError::TomlSer(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        tracing::debug!(path = %path.display(), "config saved");
        Ok(())
    }

    /// Default config for `donora init`.
    pub fn default_config(base_dir: &Path) -> Self {
        Self {
            donora: DonoraSettings {
                db_path: base_dir.join("donora.db").display().to_string(),
            },
            web: WebSettings::default(),
        }
    }

    /// Resolve the config file path: `<base_dir>/donora.toml`
    pub fn default_path(base_dir: &Path) -> PathBuf {
        base_dir.join("donora.toml")
    }

    /// Resolve the default donora home directory: `~/.donora`
    pub fn default_base_dir() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|h| h.join(".donora"))
            .ok_or_else(|| DonoraError::Config("Cannot determine home directory".to_string()))
    }
}
