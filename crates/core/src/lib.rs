//! Domain model and ports for the Herald notification dispatch pipeline.
//!
//! - [`record`]: notification records and their forward-only status.
//! - [`outcome`] / [`summary`]: per-record results and the run aggregator.
//! - [`store`] / [`gateway`] / [`observer`]: the traits the pipeline is wired from.

pub mod error;
pub mod gateway;
pub mod observer;
pub mod outcome;
pub mod record;
pub mod store;
pub mod summary;
pub mod template;
pub mod types;
