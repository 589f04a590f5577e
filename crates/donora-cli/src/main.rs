mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "donora")]
#[command(about = "Back office authorization for the Donora charity platform")]
#[command(version)]
struct Cli {
    /// Path to the Donora config directory (default: ~/.donora)
    #[arg(long, global = true, env = "DONORA_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default config, seed roles and create the bootstrap Super Admin
    Init,

    /// Start the admin API
    Serve {
        /// Override the configured listen address
        #[arg(long)]
        listen: Option<String>,
    },

    /// Check whether a role may perform an action on a module
    Check {
        /// Role name, e.g. "Admin" or "Editor"
        #[arg(long)]
        role: String,
        /// Permission names to check against instead of the stored ones
        #[arg(long = "permission")]
        permissions: Vec<String>,
        /// Module name, e.g. events
        module: String,
        /// One of view, create, edit, delete
        action: String,
    },

    /// List roles with their level and permissions
    Roles,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("donora=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let base_dir = match cli.config_dir {
        Some(ref dir) => dir.clone(),
        None => donora_core::DonoraConfig::default_base_dir()?,
    };

    let rt = tokio::runtime::Runtime::new()?;

    match cli.command {
        Commands::Init => rt.block_on(commands::init::run(&base_dir)),
        Commands::Serve { listen } => rt.block_on(commands::serve::run(&base_dir, listen)),
        Commands::Check {
            ref role,
            ref permissions,
            ref module,
            ref action,
        } => rt.block_on(commands::check::run(
            &base_dir,
            role,
            permissions.clone(),
            module,
            action,
        )),
        Commands::Roles => rt.block_on(commands::roles::run(&base_dir)),
    }
}
