//! Messaging gateway port.

use async_trait::async_trait;
use serde::Serialize;

/// What a gateway reports for one send.
///
/// Only [`SendConfirmation::Succeeded`] counts as a confirmed send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SendConfirmation {
    /// The gateway accepted the message for delivery.
    Succeeded {
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// The gateway answered and refused the message.
    Rejected { reason: String },
    /// The request never completed or the answer could not be interpreted.
    TransportError { detail: String },
}

impl SendConfirmation {
    pub fn succeeded() -> Self {
        Self::Succeeded { message: None }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }

    pub fn transport_error(detail: impl Into<String>) -> Self {
        Self::TransportError {
            detail: detail.into(),
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

/// Sends one message to one destination.
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    async fn send(&self, destination_address: &str, message_body: &str) -> SendConfirmation;
}
