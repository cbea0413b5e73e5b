//! Notification records and their forward-only status.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, RecordId};

/// Persisted flag meaning "not yet notified".
pub const FLAG_PENDING: &str = "N";

/// Persisted flag meaning "notification confirmed sent".
pub const FLAG_SENT: &str = "Y";

/// Persisted flag meaning "permanently failed".
pub const FLAG_FAILED: &str = "F";

/// Delivery status of a notification record.
///
/// Stores keep this as a nullable flag column; a missing flag is `Pending`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationStatus {
    #[default]
    Pending,
    Sent,
    Failed,
}

impl NotificationStatus {
    /// Translate the persisted flag column into a status.
    pub fn from_flag(flag: Option<&str>) -> Result<Self, CoreError> {
        match flag.map(str::trim) {
            None | Some("") | Some(FLAG_PENDING) => Ok(Self::Pending),
            Some(FLAG_SENT) => Ok(Self::Sent),
            Some(FLAG_FAILED) => Ok(Self::Failed),
            Some(other) => Err(CoreError::QueryError(format!(
                "Unrecognized status flag '{other}'"
            ))),
        }
    }

    /// The flag written to the store for this status.
    pub fn as_flag(self) -> &'static str {
        match self {
            Self::Pending => FLAG_PENDING,
            Self::Sent => FLAG_SENT,
            Self::Failed => FLAG_FAILED,
        }
    }

    /// Terminal statuses are never revisited.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Status moves only forward: `Pending -> Sent | Failed`.
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!((self, next), (Self::Pending, Self::Sent | Self::Failed))
    }

    /// Validate a requested transition, returning
    /// [`CoreError::InvalidTransition`] for anything but a forward move.
    pub fn ensure_transition(self, next: Self) -> Result<(), CoreError> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(CoreError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }
}

impl fmt::Display for NotificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Sent => "SENT",
            Self::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// A notification waiting to be dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub id: RecordId,
    /// Phone number the message goes to.
    pub destination_address: String,
    pub message_body: String,
    pub status: NotificationStatus,
}

impl NotificationRecord {
    /// Build a pending record.
    pub fn pending(
        id: DbId,
        destination_address: impl Into<String>,
        message_body: impl Into<String>,
    ) -> Self {
        Self {
            id: RecordId::new(id),
            destination_address: destination_address.into(),
            message_body: message_body.into(),
            status: NotificationStatus::Pending,
        }
    }

    pub fn is_eligible(&self) -> bool {
        self.status == NotificationStatus::Pending
    }

    /// Reject records that cannot be handed to a gateway.
    pub fn validate_destination(&self) -> Result<(), CoreError> {
        if self.destination_address.trim().is_empty() {
            return Err(CoreError::Validation(format!(
                "Record {} has no destination address",
                self.id
            )));
        }
        Ok(())
    }
}
