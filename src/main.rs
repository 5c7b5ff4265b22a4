use std::net::SocketAddr;

use tokio::net::TcpListener;

use travelmate::config::Config;
use travelmate::server::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_ansi(false)
        .init();

    // Missing .env is fine; the environment may already be populated.
    dotenvy::dotenv().ok();

    let config = Config::load();
    tracing::debug!(?config, "configuration loaded");

    let state = AppState::from_config(&config)?;
    let app = server::router(state, config.allowed_origin.as_deref());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .inspect_err(|e| tracing::error!("failed to bind {addr}: {e}"))?;
    tracing::info!("travelmate listening on {addr}");

    server::serve(listener, app, shutdown_signal()).await?;

    tracing::info!("travelmate shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to install ctrl-c handler: {e}");
        std::future::pending::<()>().await;
    }
}
