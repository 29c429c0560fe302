use std::net::SocketAddr;

use anyhow::Context;
use dsm_api::{config::ApiConfig, state::ApiState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment variables
    dotenvy::dotenv().ok();
    let config = ApiConfig::from_env().context("Invalid configuration")?;

    dsm_api::tracing::init_tracing(&config.env);
    tracing::info!("Environment: {:?}", config.env);

    let pool = dsm_db::create_pool(&config.database_url, config.db_max_connections).await?;
    dsm_db::ensure_db_and_migrate(&config.database_url, &pool).await?;
    tracing::info!("Database ready");

    dsm_api::auth::service::ensure_initial_admin(&pool, &config).await?;

    let metrics_handle = dsm_api::metrics::init_metrics()?;
    tracing::info!("Prometheus metrics exporter initialized");

    let bind_address = config.bind_address();
    let state = ApiState::new(config, pool).with_metrics(metrics_handle);

    let job_handles = dsm_api::jobs::start_background_jobs(state.pool.clone());
    tracing::info!("Background jobs started (overdue payments daily)");

    let app = dsm_api::router::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {bind_address}"))?;
    tracing::info!("Server running on http://{bind_address}");

    // Client addresses feed the per-IP rate limiter
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    for handle in job_handles {
        handle.abort();
    }
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to listen for SIGTERM: {e}"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
