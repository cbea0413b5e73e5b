//! Run summaries built from dispatch outcomes.

use serde::Serialize;
use uuid::Uuid;

use crate::outcome::DispatchOutcome;
use crate::types::{RecordId, Timestamp};

/// Counts and outcome lists for one dispatch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Records that were attempted.
    pub total: usize,
    pub send_succeeded: usize,
    pub status_updated: usize,
    /// Outcomes carrying an error detail.
    pub failures: Vec<DispatchOutcome>,
    /// Every attempted record's outcome.
    pub outcomes: Vec<DispatchOutcome>,
    /// Fetched records that were never attempted (shutdown); still pending.
    pub abandoned: Vec<RecordId>,
}

impl RunSummary {
    pub fn with_abandoned(mut self, abandoned: Vec<RecordId>) -> Self {
        self.abandoned = abandoned;
        self
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }
}

/// Aggregate outcomes into a summary. Pure; an empty input gives a zeroed
/// summary.
pub fn aggregate<I>(outcomes: I) -> RunSummary
where
    I: IntoIterator<Item = DispatchOutcome>,
{
    let mut summary = RunSummary::default();
    for outcome in outcomes {
        summary.total += 1;
        if outcome.send_succeeded() {
            summary.send_succeeded += 1;
        }
        if outcome.status_updated() {
            summary.status_updated += 1;
        }
        if outcome.has_error() {
            summary.failures.push(outcome.clone());
        }
        summary.outcomes.push(outcome);
    }
    summary
}

impl FromIterator<DispatchOutcome> for RunSummary {
    fn from_iter<T: IntoIterator<Item = DispatchOutcome>>(iter: T) -> Self {
        aggregate(iter)
    }
}

/// A summary stamped with run identity and timing.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: Timestamp,
    pub finished_at: Timestamp,
    #[serde(flatten)]
    pub summary: RunSummary,
}
