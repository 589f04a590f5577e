mod models;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use donora_auth::AuthStore;
use donora_core::WebSettings;

pub use routes::build_router;
pub use state::AppState;

/// Start the admin API on `settings.listen_addr`.
pub async fn start_web_server(
    settings: WebSettings,
    auth_store: Arc<dyn AuthStore>,
) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(&settings, auth_store));
    let app = routes::build_router(state);

    let addr: SocketAddr = settings.listen_addr.parse()?;
    tracing::info!("Starting admin API on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
