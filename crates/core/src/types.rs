use std::fmt;

use serde::{Deserialize, Serialize};

/// All store primary keys are 64-bit integers.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Identifier of a notification record, stable for the record's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(DbId);

impl RecordId {
    pub fn new(id: DbId) -> Self {
        Self(id)
    }

    pub fn get(self) -> DbId {
        self.0
    }
}

impl From<DbId> for RecordId {
    fn from(id: DbId) -> Self {
        Self(id)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
