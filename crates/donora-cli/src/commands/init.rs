use anyhow::Result;
use std::path::Path;

use donora_auth::roles::SUPER_ADMIN;
use donora_auth::{AuthError, AuthStore, SqliteAuthStore, hash_password};
use donora_core::DonoraConfig;

pub async fn run(base_dir: &Path) -> Result<()> {
    println!("Initializing Donora in {}", base_dir.display());

    std::fs::create_dir_all(base_dir)?;

    let config_path = DonoraConfig::default_path(base_dir);
    if config_path.exists() {
        println!("Config already exists at {}", config_path.display());
    } else {
        let config = DonoraConfig::default_config(base_dir);
        config.save(&config_path)?;
        println!("Created config: {}", config_path.display());
    }

    let config = DonoraConfig::load(&config_path)?;

    let store = SqliteAuthStore::open(&config.donora.db_path)?;
    store.migrate().await?;
    store.seed_defaults().await?;
    println!("Initialized database: {}", config.donora.db_path);

    let username = &config.web.admin_user;
    match store.get_user_by_username(username).await {
        Ok(_) => println!("Super Admin '{username}' already exists"),
        Err(AuthError::NotFound(_)) => {
            let role = store.get_role_by_name(SUPER_ADMIN).await?;
            let hash = hash_password(&config.web.admin_pass)?;
            store
                .create_user(username, &hash, None, Some(&role.id))
                .await?;
            println!("Created Super Admin '{username}'");
        }
        Err(e) => return Err(e.into()),
    }

    println!("\nDonora initialized. Next steps:");
    println!("  1. Change jwt_secret and admin_pass in {}", config_path.display());
    println!("  2. Run `donora serve` to start the admin API");

    Ok(())
}
