//! Herald dispatch pipeline.
//!
//! [`Dispatcher`] fetches pending records, sends each through a
//! [`NotificationGateway`](herald_core::gateway::NotificationGateway) with
//! bounded concurrency, and marks a record `Sent` only after a confirmed send.
//!
//! - [`config`]: concurrency width, timeouts and shutdown grace.
//! - [`observer`]: [`TracingObserver`], the `tracing`-backed run observer.
//! - [`memory`]: [`InMemoryStore`], a process-local record store.
//! - [`shutdown`]: SIGINT/SIGTERM handling for the binaries.

pub mod config;
pub mod dispatcher;
pub mod memory;
pub mod observer;
pub mod shutdown;

pub use config::DispatchConfig;
pub use dispatcher::Dispatcher;
pub use memory::InMemoryStore;
pub use observer::TracingObserver;
