//! Employee rows and their mapping onto notification records.

use herald_core::error::CoreError;
use herald_core::record::{NotificationRecord, NotificationStatus};
use herald_core::template::MessageTemplate;
use herald_core::types::{DbId, RecordId};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `employees` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Employee {
    pub employee_id: DbId,
    pub phone_number: String,
    /// Raw status flag; `NULL` and `'N'` both mean pending.
    pub status: Option<String>,
}

impl Employee {
    pub fn status(&self) -> Result<NotificationStatus, CoreError> {
        NotificationStatus::from_flag(self.status.as_deref())
    }

    /// Build the notification record for this employee, rendering the message
    /// body from `template`.
    pub fn into_record(self, template: &MessageTemplate) -> Result<NotificationRecord, CoreError> {
        let status = self.status()?;
        let id = RecordId::new(self.employee_id);
        Ok(NotificationRecord {
            id,
            message_body: template.render(id, &self.phone_number),
            destination_address: self.phone_number,
            status,
        })
    }
}
