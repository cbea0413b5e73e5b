//! The dispatch orchestrator.
//!
//! One run is: fetch pending records, then for each record independently
//! send -> (only on confirmation) conditional `Pending -> Sent` transition.
//! Records run concurrently up to [`DispatchConfig::max_in_flight`]; each
//! gateway call and each transition is bounded by its own timeout. A failing
//! or panicking record never affects the others. Only a failed fetch aborts
//! the run.

use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use chrono::Utc;
use futures::FutureExt;
use herald_core::error::CoreError;
use herald_core::gateway::{NotificationGateway, SendConfirmation};
use herald_core::observer::{DispatchObserver, NoopObserver};
use herald_core::outcome::{DispatchOutcome, FailureKind};
use herald_core::record::{NotificationRecord, NotificationStatus};
use herald_core::store::RecordStore;
use herald_core::summary::{aggregate, RunReport};
use herald_core::types::RecordId;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tokio::time::{sleep_until, timeout, Instant};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::DispatchConfig;

/// Everything a single record task needs.
struct RecordContext {
    store: Arc<dyn RecordStore>,
    gateway: Arc<dyn NotificationGateway>,
    observer: Arc<dyn DispatchObserver>,
    config: DispatchConfig,
}

pub struct Dispatcher {
    ctx: Arc<RecordContext>,
}

impl Dispatcher {
    pub fn new(
        store: Arc<dyn RecordStore>,
        gateway: Arc<dyn NotificationGateway>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            ctx: Arc::new(RecordContext {
                store,
                gateway,
                observer: Arc::new(NoopObserver),
                config,
            }),
        }
    }

    /// Replace the run observer (defaults to [`NoopObserver`]).
    pub fn with_observer(self, observer: Arc<dyn DispatchObserver>) -> Self {
        let ctx = &self.ctx;
        Self {
            ctx: Arc::new(RecordContext {
                store: Arc::clone(&ctx.store),
                gateway: Arc::clone(&ctx.gateway),
                observer,
                config: ctx.config.clone(),
            }),
        }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.ctx.config
    }

    /// Execute one dispatch run.
    ///
    /// Once `cancel` fires no further records are started; records already in
    /// flight get [`DispatchConfig::shutdown_grace`] to finish and are aborted
    /// after that. Records that never ran are listed in
    /// [`RunSummary::abandoned`](herald_core::summary::RunSummary::abandoned)
    /// and remain pending.
    ///
    /// Returns an error only when fetching pending records fails.
    pub async fn run(&self, cancel: CancellationToken) -> Result<RunReport, CoreError> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();

        let records: Vec<NotificationRecord> = self
            .ctx
            .store
            .fetch_pending()
            .await?
            .into_iter()
            .filter(|record| {
                if record.is_eligible() {
                    true
                } else {
                    tracing::warn!(
                        record_id = %record.id,
                        status = %record.status,
                        "Source returned a non-pending record, skipping"
                    );
                    false
                }
            })
            .collect();

        self.ctx.observer.run_started(records.len());
        tracing::debug!(%run_id, pending = records.len(), "Fetched pending records");

        let semaphore = Arc::new(Semaphore::new(self.ctx.config.max_in_flight.max(1)));
        let mut tasks: JoinSet<DispatchOutcome> = JoinSet::new();
        let mut in_flight: HashSet<RecordId> = HashSet::new();
        let mut abandoned: Vec<RecordId> = Vec::new();

        let mut queue = records.into_iter();
        while let Some(record) = queue.next() {
            let permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    abandoned.push(record.id);
                    abandoned.extend(queue.by_ref().map(|r| r.id));
                    break;
                }
                permit = Arc::clone(&semaphore).acquire_owned() => permit
                    .map_err(|_| CoreError::Internal("Dispatch semaphore closed".to_string()))?,
            };

            in_flight.insert(record.id);
            let ctx = Arc::clone(&self.ctx);
            tasks.spawn(async move {
                let _permit = permit;
                dispatch_guarded(ctx, record).await
            });
        }

        let outcomes = self.collect(tasks, &mut in_flight, &cancel).await;
        abandoned.extend(in_flight);

        if !abandoned.is_empty() {
            tracing::warn!(
                %run_id,
                abandoned = abandoned.len(),
                "Run cancelled, abandoned records stay pending"
            );
        }

        let summary = aggregate(outcomes).with_abandoned(abandoned);
        self.ctx.observer.run_finished(&summary);

        Ok(RunReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            summary,
        })
    }

    /// Drain record tasks, honouring the shutdown grace period.
    ///
    /// Ids of finished records are removed from `in_flight`; whatever is left
    /// afterwards was aborted.
    async fn collect(
        &self,
        mut tasks: JoinSet<DispatchOutcome>,
        in_flight: &mut HashSet<RecordId>,
        cancel: &CancellationToken,
    ) -> Vec<DispatchOutcome> {
        let grace = self.ctx.config.shutdown_grace;
        let mut outcomes = Vec::with_capacity(tasks.len());
        let mut deadline = cancel.is_cancelled().then(|| Instant::now() + grace);
        let mut aborted = false;

        loop {
            tokio::select! {
                joined = tasks.join_next() => match joined {
                    Some(result) => {
                        if let Some(outcome) = self.finish(result) {
                            in_flight.remove(&outcome.record_id());
                            outcomes.push(outcome);
                        }
                    }
                    None => break,
                },
                _ = cancel.cancelled(), if deadline.is_none() => {
                    tracing::info!(
                        in_flight = tasks.len(),
                        grace_secs = grace.as_secs(),
                        "Cancellation requested, waiting for in-flight records"
                    );
                    deadline = Some(Instant::now() + grace);
                }
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() && !aborted => {
                    tracing::warn!(in_flight = tasks.len(), "Shutdown grace elapsed, aborting in-flight records");
                    tasks.abort_all();
                    aborted = true;
                }
            }
        }

        outcomes
    }

    fn finish(&self, result: Result<DispatchOutcome, JoinError>) -> Option<DispatchOutcome> {
        match result {
            Ok(outcome) => {
                if outcome.has_error() {
                    self.ctx.observer.record_failed(&outcome);
                }
                Some(outcome)
            }
            Err(e) if e.is_cancelled() => None,
            Err(e) => {
                tracing::error!(error = %e, "Record task failed outside the panic guard");
                None
            }
        }
    }
}

/// How far a record got. Read back when its processing panics; starts at
/// zero, meaning nothing was confirmed.
#[derive(Default)]
struct Progress(AtomicU8);

impl Progress {
    const SENT: u8 = 1;
    const STATUS_UPDATED: u8 = 2;

    fn mark(&self, stage: u8) {
        self.0.store(stage, Ordering::Release);
    }

    fn stage(&self) -> u8 {
        self.0.load(Ordering::Acquire)
    }
}

/// Run one record, turning a panic into a `PANICKED` outcome that still
/// reflects whether the send and the transition already happened.
async fn dispatch_guarded(ctx: Arc<RecordContext>, record: NotificationRecord) -> DispatchOutcome {
    let progress = Progress::default();

    match AssertUnwindSafe(dispatch_record(&ctx, &record, &progress))
        .catch_unwind()
        .await
    {
        Ok(outcome) => outcome,
        Err(payload) => {
            let detail = format!(
                "Record processing panicked: {}",
                panic_message(payload.as_ref())
            );
            let stage = progress.stage();
            tracing::error!(record_id = %record.id, stage, error = %detail, "Record processing panicked");
            match stage {
                Progress::STATUS_UPDATED => {
                    DispatchOutcome::delivered_with_error(&record, FailureKind::Panicked, detail)
                }
                Progress::SENT => {
                    DispatchOutcome::sent_not_updated(&record, FailureKind::Panicked, detail)
                }
                _ => DispatchOutcome::not_sent(
                    record.id,
                    record.destination_address.clone(),
                    FailureKind::Panicked,
                    detail,
                ),
            }
        }
    }
}

async fn dispatch_record(
    ctx: &RecordContext,
    record: &NotificationRecord,
    progress: &Progress,
) -> DispatchOutcome {
    if let Err(e) = record.validate_destination() {
        return DispatchOutcome::not_sent(
            record.id,
            record.destination_address.clone(),
            FailureKind::InvalidDestination,
            e.to_string(),
        );
    }

    let send_timeout = ctx.config.send_timeout;
    let confirmation = timeout(
        send_timeout,
        ctx.gateway
            .send(&record.destination_address, &record.message_body),
    )
    .await
    .unwrap_or_else(|_| {
        SendConfirmation::transport_error(format!(
            "Gateway did not answer within {}ms",
            send_timeout.as_millis()
        ))
    });

    match &confirmation {
        SendConfirmation::Succeeded { .. } => {
            progress.mark(Progress::SENT);
            ctx.observer.send_confirmed(record);
        }
        SendConfirmation::Rejected { reason } => {
            ctx.observer.send_failed(record, &confirmation);
            return DispatchOutcome::not_sent(
                record.id,
                record.destination_address.clone(),
                FailureKind::Rejected,
                format!("Gateway rejected message: {reason}"),
            );
        }
        SendConfirmation::TransportError { detail } => {
            ctx.observer.send_failed(record, &confirmation);
            return DispatchOutcome::not_sent(
                record.id,
                record.destination_address.clone(),
                FailureKind::TransportError,
                CoreError::TransportError(detail.clone()).to_string(),
            );
        }
    }

    let transition_timeout = ctx.config.transition_timeout;
    let transition = timeout(
        transition_timeout,
        ctx.store.transition_status(
            record.id,
            NotificationStatus::Pending,
            NotificationStatus::Sent,
        ),
    )
    .await;

    match transition {
        Ok(Ok(1)) => {
            progress.mark(Progress::STATUS_UPDATED);
            ctx.observer.status_updated(record);
            DispatchOutcome::delivered(record)
        }
        Ok(Ok(0)) => {
            let conflict = CoreError::TransitionConflict {
                id: record.id,
                expected: NotificationStatus::Pending,
            };
            DispatchOutcome::sent_not_updated(
                record,
                FailureKind::TransitionConflict,
                conflict.to_string(),
            )
        }
        Ok(Ok(affected)) => DispatchOutcome::sent_not_updated(
            record,
            FailureKind::StoreError,
            format!("Status transition affected {affected} rows, expected 1"),
        ),
        Ok(Err(e)) => {
            DispatchOutcome::sent_not_updated(record, FailureKind::StoreError, e.to_string())
        }
        Err(_) => DispatchOutcome::sent_not_updated(
            record,
            FailureKind::StoreError,
            format!(
                "Status transition did not complete within {}ms",
                transition_timeout.as_millis()
            ),
        ),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
