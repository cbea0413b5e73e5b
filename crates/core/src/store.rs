//! Store ports: fetching pending records and conditional status writes.

use async_trait::async_trait;

use crate::error::CoreError;
use crate::record::{NotificationRecord, NotificationStatus};
use crate::types::RecordId;

/// Fetches the records whose persisted status is `Pending` right now.
///
/// Eligibility is decided by the store at fetch time. No ordering is implied.
#[async_trait]
pub trait PendingRecordSource: Send + Sync {
    /// Fails with [`CoreError::StoreUnavailable`] when the store cannot be
    /// reached and [`CoreError::QueryError`] when the fetch is rejected.
    async fn fetch_pending(&self) -> Result<Vec<NotificationRecord>, CoreError>;
}

/// Conditional status write.
#[async_trait]
pub trait StatusTransition: Send + Sync {
    /// Move record `id` from `from` to `to`, only if its current status is
    /// still `from`. Returns the number of rows actually changed.
    async fn transition_status(
        &self,
        id: RecordId,
        from: NotificationStatus,
        to: NotificationStatus,
    ) -> Result<u64, CoreError>;
}

/// A store that is both a record source and a transition target.
pub trait RecordStore: PendingRecordSource + StatusTransition {}

impl<T: PendingRecordSource + StatusTransition + ?Sized> RecordStore for T {}
