pub mod check;
pub mod init;
pub mod roles;
pub mod serve;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use donora_auth::{AuthStore, SqliteAuthStore};
use donora_core::DonoraConfig;

/// Load the config and open its auth database, applying migrations.
pub(crate) async fn open_store(base_dir: &Path) -> Result<(DonoraConfig, Arc<dyn AuthStore>)> {
    let config_path = DonoraConfig::default_path(base_dir);
    let config = DonoraConfig::load(&config_path)?;
    let store = SqliteAuthStore::open(&config.donora.db_path)?;
    store.migrate().await?;
    Ok((config, Arc::new(store)))
}
