use std::sync::Arc;

use anyhow::Context;
use herald_db::SqlRecordStore;
use herald_pipeline::config::message_template_from_env;
use herald_pipeline::shutdown::cancel_on_shutdown;
use herald_pipeline::{DispatchConfig, Dispatcher, TracingObserver};
use herald_sms::{MnotifyGateway, SmsConfig};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use herald_worker::config::WorkerConfig;
use herald_worker::schedule;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "herald_worker=debug,herald_pipeline=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let worker_config = WorkerConfig::from_env();
    let sms_config = SmsConfig::from_env().context("SMS_API_KEY must be set")?;
    let dispatch_config = DispatchConfig::from_env();
    tracing::info!(?worker_config, ?sms_config, ?dispatch_config, "Worker starting");

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = herald_db::create_pool(&database_url)
        .await
        .context("Failed to connect to database")?;
    herald_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let store = SqlRecordStore::new(pool.clone(), message_template_from_env());
    let gateway = MnotifyGateway::new(sms_config).context("Failed to build SMS client")?;
    let dispatcher = Dispatcher::new(Arc::new(store), Arc::new(gateway), dispatch_config)
        .with_observer(Arc::new(TracingObserver));

    let cancel = CancellationToken::new();
    let signals = cancel_on_shutdown(cancel.clone());

    let result = match worker_config.interval {
        Some(every) => {
            schedule::run_every(&dispatcher, every, cancel.clone()).await;
            Ok(())
        }
        None => schedule::run_once(&dispatcher, cancel.clone())
            .await
            .map(|_| ())
            .context("Dispatch run failed"),
    };

    cancel.cancel();
    let _ = signals.await;
    pool.close().await;

    result
}
