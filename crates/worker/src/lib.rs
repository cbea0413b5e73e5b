//! Herald scheduled worker: runs the dispatch pipeline once or on a fixed
//! interval.

pub mod config;
pub mod schedule;
