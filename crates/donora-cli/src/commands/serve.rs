use anyhow::Result;
use std::path::Path;

pub async fn run(base_dir: &Path, listen: Option<String>) -> Result<()> {
    let (config, store) = super::open_store(base_dir).await?;
    let mut settings = config.web;
    if let Some(addr) = listen {
        settings.listen_addr = addr;
    }
    donora_web::start_web_server(settings, store).await
}
