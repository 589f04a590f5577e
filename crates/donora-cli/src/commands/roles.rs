use anyhow::Result;
use std::path::Path;

pub async fn run(base_dir: &Path) -> Result<()> {
    let (_config, store) = super::open_store(base_dir).await?;
    let roles = store.list_roles().await?;

    if roles.is_empty() {
        println!("No roles found. Run `donora init` first.");
        return Ok(());
    }

    println!("{:<20} {:<12} {:<8} {}", "ROLE", "LEVEL", "SYSTEM", "PERMISSIONS");
    println!("{}", "-".repeat(80));

    for role in &roles {
        let perms = store.list_role_permissions(&role.id).await?;
        let names: Vec<&str> = perms.iter().map(|p| p.name.as_str()).collect();
        let summary = if names.is_empty() {
            "-".to_string()
        } else {
            names.join(",")
        };
        println!(
            "{:<20} {:<12} {:<8} {}",
            role.name,
            role.level().to_string(),
            if role.is_system { "yes" } else { "no" },
            summary,
        );
    }

    Ok(())
}
