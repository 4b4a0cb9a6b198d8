use std::{net::SocketAddr, sync::Arc};

use server_api::{feed::WaqiFeed, ApiContext};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod api;
mod app_state;
mod config;

use app_state::AppState;
use config::load_settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings();
    let feed = WaqiFeed::new(
        settings.upstream_url.clone(),
        settings.upstream_token.clone(),
        settings.upstream_timeout(),
    )?;
    let api = ApiContext {
        feed: Arc::new(feed),
        default_location: settings.default_location.clone(),
    };

    let app = api::build_router(Arc::new(AppState { api }));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, upstream = %settings.upstream_url, "aqi edge server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}
