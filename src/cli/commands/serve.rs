use anyhow::Context;
use tracing::info;

use crate::config::AppConfig;
use crate::database::DatabaseManager;
use crate::{routes, AppState};

pub async fn handle(config: AppConfig, migrate: bool) -> anyhow::Result<()> {
    info!(
        "Starting Desa Digital API in {:?} mode, database {}",
        config.environment,
        config.redacted_database_url()
    );

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    if migrate {
        DatabaseManager::migrate(&pool).await.context("failed to apply migrations")?;
    }

    let bind_addr = config.bind_addr();
    let state = AppState::new(pool, config).context("failed to initialise token service")?;
    let app = routes::app(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

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
