use anyhow::Context;
use tokio::net::TcpListener;

use atrium_backend::core::config::Settings;
use atrium_backend::core::logging;
use atrium_backend::server::router;
use atrium_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init();

    let settings = Settings::from_env().context("Failed to load settings")?;
    let state = AppState::initialize(settings).context("Failed to initialize state")?;

    let bind_addr = format!("127.0.0.1:{}", state.settings.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;

    tracing::info!("Listening on {}", addr);

    let app = router::router(state);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
