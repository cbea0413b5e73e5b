use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use herald_db::SqlRecordStore;
use herald_pipeline::config::message_template_from_env;
use herald_pipeline::shutdown::shutdown_signal;
use herald_pipeline::{DispatchConfig, Dispatcher, TracingObserver};
use herald_sms::{MnotifyGateway, SmsConfig};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use herald_api::config::ServerConfig;
use herald_api::router::build_app_router;
use herald_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "herald_api=debug,herald_pipeline=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env()?;
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let sms_config = SmsConfig::from_env().context("SMS_API_KEY must be set")?;
    let dispatch_config = DispatchConfig::from_env();
    tracing::info!(?sms_config, ?dispatch_config, "Loaded dispatch configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = herald_db::create_pool(&database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connection pool created");

    herald_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    tracing::info!("Database health check passed");

    herald_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    // --- Pipeline ---
    let store = SqlRecordStore::new(pool.clone(), message_template_from_env());
    let gateway = MnotifyGateway::new(sms_config).context("Failed to build SMS client")?;
    let dispatcher = Dispatcher::new(Arc::new(store), Arc::new(gateway), dispatch_config)
        .with_observer(Arc::new(TracingObserver));

    // --- App state ---
    let shutdown = CancellationToken::new();
    let state = AppState::new(pool.clone(), dispatcher, config.clone(), shutdown.clone());
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().context("Invalid HOST address")?,
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    // A run in progress sees the cancelled token, drains within its grace
    // period and still answers its request before the server exits.
    let cancel = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            cancel.cancel();
        })
        .await
        .context("Server error")?;

    tracing::info!("Server stopped accepting connections, closing database pool");
    pool.close().await;
    tracing::info!("Graceful shutdown complete");

    Ok(())
}
