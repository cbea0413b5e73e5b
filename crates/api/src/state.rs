use std::sync::Arc;

use herald_pipeline::Dispatcher;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything shared sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub pool: herald_db::DbPool,
    pub dispatcher: Arc<Dispatcher>,
    /// Held for the duration of a push run so runs never overlap.
    pub run_lock: Arc<Mutex<()>>,
    /// Cancelled on shutdown; each run gets a child token.
    pub shutdown: CancellationToken,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(
        pool: herald_db::DbPool,
        dispatcher: Dispatcher,
        config: ServerConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            pool,
            dispatcher: Arc::new(dispatcher),
            run_lock: Arc::new(Mutex::new(())),
            shutdown,
            config: Arc::new(config),
        }
    }
}
