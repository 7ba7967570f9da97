use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use arena_server::config::AppConfig;
use arena_server::database::init_db;
use arena_server::seed::{ensure_indexes, seed_bootstrap_admin};
use arena_server::state::AppState;
use arena_server::utils::image::HttpImageValidator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = init_db(&config.database.url, config.database.max_connections)
        .await
        .context("Failed to initialize database")?;
    ensure_indexes(&db)
        .await
        .context("Failed to create indexes")?;
    if let Some(admin) = &config.bootstrap_admin {
        seed_bootstrap_admin(&db, admin)
            .await
            .context("Failed to seed bootstrap admin")?;
    }

    let images = HttpImageValidator::new(
        Duration::from_secs(config.entry.image_timeout_secs),
        config.entry.max_image_bytes,
    )
    .context("Failed to build image validator")?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        db,
        config,
        images: Arc::new(images),
    };
    let app = arena_server::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);
    info!("Swagger UI at http://{}/swagger-ui", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
