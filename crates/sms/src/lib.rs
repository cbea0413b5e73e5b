//! SMS delivery for Herald.
//!
//! [`MnotifyGateway`] implements
//! [`NotificationGateway`](herald_core::gateway::NotificationGateway) against
//! the mNotify `smsapi` HTTP endpoint. Credentials come from [`SmsConfig`].

pub mod config;
pub mod mnotify;

pub use config::SmsConfig;
pub use mnotify::{MnotifyGateway, SmsError};
