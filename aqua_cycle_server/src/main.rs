mod camera;
mod detector;
mod routes;
mod state;

use anyhow::Context;
use aqua_cycle::core_modules::sprite_store::SpriteStore;
use axum::Router;
use axum::routing::{get, post};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::state::{AppState, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env();

    // Sprite assets are an unrecoverable precondition; a missing or
    // unreadable file stops startup here.
    let sprites = SpriteStore::load(&config.asset_dir)
        .with_context(|| format!("loading sprite assets from {}", config.asset_dir.display()))?;
    anyhow::ensure!(
        config.model_path.exists(),
        "hand landmark model not found at {}",
        config.model_path.display()
    );

    let state = AppState::new(config.clone(), sprites);
    let app = Router::new()
        .route("/", get(routes::health))
        .route("/camera/start", post(routes::camera_start))
        .route("/camera/stop", post(routes::camera_stop))
        .route("/video", get(routes::video))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    info!("aqua_cycle server listening on http://{}", config.bind_addr);
    axum::serve(listener, app).await.context("serving")?;
    Ok(())
}
