//! Per-record dispatch outcomes.
//!
//! Fields are private and outcomes are only built through constructors, so an
//! outcome reporting `status_updated` without `send_succeeded` cannot exist.

use serde::Serialize;

use crate::record::NotificationRecord;
use crate::types::RecordId;

/// Why a record did not end fully processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    /// The gateway answered but did not accept the message.
    Rejected,
    /// Network failure, timeout or an answer that could not be read.
    TransportError,
    /// The message went out but the status write failed.
    StoreError,
    /// The message went out but another run already moved the record.
    TransitionConflict,
    /// The record has no usable destination; nothing was sent.
    InvalidDestination,
    /// Processing panicked.
    Panicked,
}

impl FailureKind {
    /// Whether this failure happened after a confirmed send.
    pub fn after_send(self) -> bool {
        matches!(self, Self::StoreError | Self::TransitionConflict)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchOutcome {
    record_id: RecordId,
    destination_address: String,
    send_succeeded: bool,
    status_updated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<FailureKind>,
}

impl DispatchOutcome {
    /// Sent and marked `Sent` in the store.
    pub fn delivered(record: &NotificationRecord) -> Self {
        Self {
            record_id: record.id,
            destination_address: record.destination_address.clone(),
            send_succeeded: true,
            status_updated: true,
            error_detail: None,
            failure: None,
        }
    }

    /// Sent and marked `Sent`, but processing failed afterwards.
    pub fn delivered_with_error(
        record: &NotificationRecord,
        failure: FailureKind,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            error_detail: Some(detail.into()),
            failure: Some(failure),
            ..Self::delivered(record)
        }
    }

    /// Sent, but the status transition did not take effect. The record stays
    /// `Pending` and is offered again next run.
    pub fn sent_not_updated(
        record: &NotificationRecord,
        failure: FailureKind,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            record_id: record.id,
            destination_address: record.destination_address.clone(),
            send_succeeded: true,
            status_updated: false,
            error_detail: Some(detail.into()),
            failure: Some(failure),
        }
    }

    /// Nothing confirmed; no transition was attempted.
    pub fn not_sent(
        record_id: RecordId,
        destination_address: impl Into<String>,
        failure: FailureKind,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            record_id,
            destination_address: destination_address.into(),
            send_succeeded: false,
            status_updated: false,
            error_detail: Some(detail.into()),
            failure: Some(failure),
        }
    }

    pub fn record_id(&self) -> RecordId {
        self.record_id
    }

    pub fn destination_address(&self) -> &str {
        &self.destination_address
    }

    pub fn send_succeeded(&self) -> bool {
        self.send_succeeded
    }

    pub fn status_updated(&self) -> bool {
        self.status_updated
    }

    pub fn error_detail(&self) -> Option<&str> {
        self.error_detail.as_deref()
    }

    pub fn failure(&self) -> Option<FailureKind> {
        self.failure
    }

    pub fn has_error(&self) -> bool {
        self.error_detail.as_deref().is_some_and(|d| !d.is_empty())
    }
}
