use crate::record::NotificationStatus;
use crate::types::RecordId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Query rejected: {0}")]
    QueryError(String),

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Transition conflict: record {id} is no longer {expected}")]
    TransitionConflict {
        id: RecordId,
        expected: NotificationStatus,
    },

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: NotificationStatus,
        to: NotificationStatus,
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Run-level errors abort a dispatch run; everything else stays local to
    /// one record.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CoreError::StoreUnavailable(_) | CoreError::QueryError(_))
    }
}
