//! Process-local record store.
//!
//! Holds records behind a mutex and applies the same conditional-transition
//! rule as the SQL store: a write only lands if the current status still
//! matches the expected one. Every applied transition is kept in a history so
//! callers can check that records only ever moved forward.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use herald_core::error::CoreError;
use herald_core::record::{NotificationRecord, NotificationStatus};
use herald_core::store::{PendingRecordSource, StatusTransition};
use herald_core::types::RecordId;

#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    records: HashMap<RecordId, NotificationRecord>,
    /// Applied transitions in order: `(id, from, to)`.
    history: Vec<(RecordId, NotificationStatus, NotificationStatus)>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = NotificationRecord>) -> Self {
        let store = Self::new();
        for record in records {
            store.insert(record);
        }
        store
    }

    /// Insert or replace a record.
    pub fn insert(&self, record: NotificationRecord) {
        self.lock().records.insert(record.id, record);
    }

    pub fn status(&self, id: RecordId) -> Option<NotificationStatus> {
        self.lock().records.get(&id).map(|r| r.status)
    }

    pub fn count_with_status(&self, status: NotificationStatus) -> usize {
        self.lock()
            .records
            .values()
            .filter(|r| r.status == status)
            .count()
    }

    /// Applied transitions for one record, oldest first.
    pub fn history(&self, id: RecordId) -> Vec<(NotificationStatus, NotificationStatus)> {
        self.lock()
            .history
            .iter()
            .filter(|(rid, _, _)| *rid == id)
            .map(|(_, from, to)| (*from, *to))
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // Every write is a single statement, so a poisoned map is still consistent.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl PendingRecordSource for InMemoryStore {
    async fn fetch_pending(&self) -> Result<Vec<NotificationRecord>, CoreError> {
        Ok(self
            .lock()
            .records
            .values()
            .filter(|r| r.is_eligible())
            .cloned()
            .collect())
    }
}

#[async_trait]
impl StatusTransition for InMemoryStore {
    async fn transition_status(
        &self,
        id: RecordId,
        from: NotificationStatus,
        to: NotificationStatus,
    ) -> Result<u64, CoreError> {
        from.ensure_transition(to)?;
        let mut inner = self.lock();
        match inner.records.get_mut(&id) {
            Some(record) if record.status == from => {
                record.status = to;
                inner.history.push((id, from, to));
                Ok(1)
            }
            _ => Ok(0),
        }
    }
}
