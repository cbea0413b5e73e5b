//! [`RecordStore`](herald_core::store::RecordStore) adapter over the
//! `employees` table.

use async_trait::async_trait;
use herald_core::error::CoreError;
use herald_core::record::{NotificationRecord, NotificationStatus};
use herald_core::store::{PendingRecordSource, StatusTransition};
use herald_core::template::MessageTemplate;
use herald_core::types::RecordId;

use crate::repositories::EmployeeRepo;
use crate::{classify_error, DbPool};

#[derive(Clone)]
pub struct SqlRecordStore {
    pool: DbPool,
    template: MessageTemplate,
}

impl SqlRecordStore {
    pub fn new(pool: DbPool, template: MessageTemplate) -> Self {
        Self { pool, template }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl PendingRecordSource for SqlRecordStore {
    async fn fetch_pending(&self) -> Result<Vec<NotificationRecord>, CoreError> {
        let rows = EmployeeRepo::list_pending(&self.pool)
            .await
            .map_err(classify_error)?;

        rows.into_iter()
            .map(|row| row.into_record(&self.template))
            .collect()
    }
}

#[async_trait]
impl StatusTransition for SqlRecordStore {
    async fn transition_status(
        &self,
        id: RecordId,
        from: NotificationStatus,
        to: NotificationStatus,
    ) -> Result<u64, CoreError> {
        from.ensure_transition(to)?;
        let affected = EmployeeRepo::update_status(&self.pool, id.get(), from, to)
            .await
            .map_err(classify_error)?;
        tracing::debug!(record_id = %id, %from, %to, affected, "Status transition applied");
        Ok(affected)
    }
}
