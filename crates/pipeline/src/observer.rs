//! Run observer that reports through `tracing`.

use herald_core::gateway::SendConfirmation;
use herald_core::observer::DispatchObserver;
use herald_core::outcome::DispatchOutcome;
use herald_core::record::NotificationRecord;
use herald_core::summary::RunSummary;

pub struct TracingObserver;

impl DispatchObserver for TracingObserver {
    fn run_started(&self, pending: usize) {
        tracing::info!(pending, "Dispatch run started");
    }

    fn send_confirmed(&self, record: &NotificationRecord) {
        tracing::info!(
            record_id = %record.id,
            to = %record.destination_address,
            "SMS sent successfully to {} for employee ID {}",
            record.destination_address,
            record.id
        );
    }

    fn send_failed(&self, record: &NotificationRecord, confirmation: &SendConfirmation) {
        tracing::info!(
            record_id = %record.id,
            to = %record.destination_address,
            ?confirmation,
            "Failed to send SMS to {} for employee ID {}",
            record.destination_address,
            record.id
        );
    }

    fn status_updated(&self, record: &NotificationRecord) {
        tracing::debug!(record_id = %record.id, "Record marked as sent");
    }

    fn record_failed(&self, outcome: &DispatchOutcome) {
        tracing::warn!(
            record_id = %outcome.record_id(),
            failure = ?outcome.failure(),
            send_succeeded = outcome.send_succeeded(),
            error = outcome.error_detail().unwrap_or_default(),
            "Record not fully processed"
        );
    }

    fn run_finished(&self, summary: &RunSummary) {
        tracing::info!(
            total = summary.total,
            send_succeeded = summary.send_succeeded,
            status_updated = summary.status_updated,
            failures = summary.failure_count(),
            abandoned = summary.abandoned.len(),
            "Dispatch run finished"
        );
    }
}
