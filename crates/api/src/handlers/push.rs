//! Handler for `POST /push`: one dispatch run over every pending employee.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use herald_core::error::CoreError;
use herald_core::outcome::DispatchOutcome;
use herald_core::record::NotificationStatus;
use herald_core::summary::RunReport;
use herald_core::types::{RecordId, Timestamp};
use herald_db::repositories::EmployeeRepo;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Counts and failures of a run. Outcomes are listed once, in
/// [`PushResponse::updated_employees`].
#[derive(Debug, Serialize)]
pub struct PushSummary {
    pub run_id: Uuid,
    pub started_at: Timestamp,
    pub finished_at: Timestamp,
    pub total: usize,
    pub send_succeeded: usize,
    pub status_updated: usize,
    pub failures: Vec<DispatchOutcome>,
    pub abandoned: Vec<RecordId>,
}

#[derive(Debug, Serialize)]
pub struct PushResponse {
    pub updated_employees: Vec<DispatchOutcome>,
    pub summary: PushSummary,
    /// Employees in `Sent` after the run, across all runs.
    pub total_employees_with_status_sent: i64,
}

impl PushResponse {
    fn new(report: RunReport, total_employees_with_status_sent: i64) -> Self {
        let RunReport {
            run_id,
            started_at,
            finished_at,
            summary,
        } = report;

        Self {
            updated_employees: summary.outcomes,
            summary: PushSummary {
                run_id,
                started_at,
                finished_at,
                total: summary.total,
                send_succeeded: summary.send_succeeded,
                status_updated: summary.status_updated,
                failures: summary.failures,
                abandoned: summary.abandoned,
            },
            total_employees_with_status_sent,
        }
    }
}

/// POST /push
///
/// Runs the dispatch pipeline once. Returns 409 if a run is already active.
///
/// The run executes on its own task. If the request goes away, the run is
/// cancelled through its token and drains within the shutdown grace period
/// instead of being dropped mid-record.
pub async fn push(State(state): State<AppState>) -> AppResult<Json<PushResponse>> {
    let run_guard = Arc::clone(&state.run_lock)
        .try_lock_owned()
        .map_err(|_| AppError::RunInProgress)?;

    let cancel = state.shutdown.child_token();
    let _cancel_on_drop = cancel.clone().drop_guard();
    let dispatcher = Arc::clone(&state.dispatcher);

    let run = tokio::spawn(async move {
        let _run_guard = run_guard;
        let report = dispatcher.run(cancel).await?;
        tracing::info!(
            run_id = %report.run_id,
            total = report.summary.total,
            status_updated = report.summary.status_updated,
            failures = report.summary.failure_count(),
            abandoned = report.summary.abandoned.len(),
            "Push run complete"
        );
        Ok::<_, CoreError>(report)
    });

    let report = run
        .await
        .map_err(|e| AppError::InternalError(format!("Dispatch run task failed: {e}")))??;

    let total_sent = EmployeeRepo::count_with_status(&state.pool, NotificationStatus::Sent).await?;

    Ok(Json(PushResponse::new(report, total_sent)))
}
