use anyhow::Context;
use tracing_subscriber::EnvFilter;

use kol_progress_api::{config, handlers, is_development, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, PROGRESS_STORE, etc.
    let _ = dotenvy::dotenv();

    let config = config::config();

    let default_filter = if is_development!() || config.api.enable_request_logging {
        "kol_progress_api=debug,tower_http=debug,info"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    tracing::info!(
        "Starting KOL Progress API in {:?} mode ({:?} store)",
        config.environment,
        config.progress.store_backend
    );

    let state = AppState::from_config(config.clone())
        .await
        .context("failed to initialize progress store")?;
    let pool = state.pool.clone();
    let app = handlers::app(state);

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("KOL Progress API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server")?;

    if let Some(pool) = pool {
        pool.close().await;
        tracing::info!("Closed database pool");
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
