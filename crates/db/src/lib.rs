//! SQLite persistence for Herald.
//!
//! Exposes pool setup, migrations, the [`repositories::EmployeeRepo`] query
//! layer and [`store::SqlRecordStore`], the adapter the dispatch pipeline reads
//! pending records from and writes status transitions through.

use std::str::FromStr;
use std::time::Duration;

use herald_core::error::CoreError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

pub mod models;
pub mod repositories;
pub mod store;

pub use store::SqlRecordStore;

pub type DbPool = sqlx::SqlitePool;

/// Default pool size for file-backed databases.
const DEFAULT_MAX_CONNECTIONS: u32 = 8;

/// How long a connection waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// How long to wait for a free pool connection.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// SQLite primary result codes for a busy or locked database.
const SQLITE_BUSY: i64 = 5;
const SQLITE_LOCKED: i64 = 6;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    create_pool_with_size(database_url, DEFAULT_MAX_CONNECTIONS).await
}

/// Create a connection pool with an explicit connection limit.
///
/// In-memory databases live only as long as their connection, so their
/// connections are never reaped for idleness or age.
pub async fn create_pool_with_size(
    database_url: &str,
    max_connections: u32,
) -> Result<DbPool, sqlx::Error> {
    let connect_options = SqliteConnectOptions::from_str(database_url)?
        .busy_timeout(BUSY_TIMEOUT)
        .create_if_missing(true);

    let mut options = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT);

    if database_url.contains(":memory:") {
        options = options.idle_timeout(None).max_lifetime(None);
    }

    options.connect_with(connect_options).await
}

/// Single-connection in-memory database with migrations applied.
pub async fn in_memory_pool() -> Result<DbPool, sqlx::Error> {
    let pool = create_pool_with_size("sqlite::memory:", 1).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

/// Verify the database answers a trivial query.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    tracing::debug!("Running database migrations");
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Map a sqlx error onto the store error taxonomy.
///
/// - Connection-level failures, pool exhaustion and busy/locked databases are
///   [`CoreError::StoreUnavailable`].
/// - Everything else is [`CoreError::QueryError`].
pub fn classify_error(err: sqlx::Error) -> CoreError {
    match &err {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_) => CoreError::StoreUnavailable(err.to_string()),
        sqlx::Error::Database(db_err)
            if db_err.code().as_deref().is_some_and(is_busy_code) =>
        {
            CoreError::StoreUnavailable(err.to_string())
        }
        _ => CoreError::QueryError(err.to_string()),
    }
}

/// Whether a SQLite result code, primary or extended, means busy or locked.
/// Extended codes keep the primary code in their low byte.
fn is_busy_code(code: &str) -> bool {
    code.parse::<i64>()
        .is_ok_and(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
}
