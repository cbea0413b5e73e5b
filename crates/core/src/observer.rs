//! Observer hooks for dispatch runs.
//!
//! The orchestrator reports what happens through an injected
//! [`DispatchObserver`] instead of writing to a global logger.

use crate::gateway::SendConfirmation;
use crate::outcome::DispatchOutcome;
use crate::record::NotificationRecord;
use crate::summary::RunSummary;

/// All hooks default to doing nothing.
pub trait DispatchObserver: Send + Sync {
    fn run_started(&self, _pending: usize) {}

    fn send_confirmed(&self, _record: &NotificationRecord) {}

    fn send_failed(&self, _record: &NotificationRecord, _confirmation: &SendConfirmation) {}

    fn status_updated(&self, _record: &NotificationRecord) {}

    fn record_failed(&self, _outcome: &DispatchOutcome) {}

    fn run_finished(&self, _summary: &RunSummary) {}
}

pub struct NoopObserver;

impl DispatchObserver for NoopObserver {}
