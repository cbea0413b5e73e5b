//! Run loops for the worker binary.

use std::time::Duration;

use herald_core::error::CoreError;
use herald_core::summary::RunReport;
use herald_pipeline::Dispatcher;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Run the pipeline once and log the JSON report.
pub async fn run_once(
    dispatcher: &Dispatcher,
    cancel: CancellationToken,
) -> Result<RunReport, CoreError> {
    let report = dispatcher.run(cancel).await?;
    log_report(&report);
    Ok(report)
}

/// Start a run every `every` until `cancel` fires. Fatal run errors are logged
/// and the next tick tries again. Returns the number of runs started.
pub async fn run_every(dispatcher: &Dispatcher, every: Duration, cancel: CancellationToken) -> usize {
    tracing::info!(interval_secs = every.as_secs(), "Scheduled dispatch started");

    let mut interval = tokio::time::interval(every);
    // A run longer than the interval pushes the next one back instead of
    // firing a burst.
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut runs = 0;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!(runs, "Scheduled dispatch stopping");
                break;
            }
            _ = interval.tick() => {
                runs += 1;
                if let Err(e) = run_once(dispatcher, cancel.child_token()).await {
                    tracing::error!(error = %e, "Dispatch run failed");
                }
            }
        }
    }

    runs
}

fn log_report(report: &RunReport) {
    match serde_json::to_string(report) {
        Ok(json) => tracing::info!(
            run_id = %report.run_id,
            total = report.summary.total,
            status_updated = report.summary.status_updated,
            failures = report.summary.failure_count(),
            summary = %json,
            "Dispatch run complete"
        ),
        Err(e) => tracing::warn!(error = %e, "Failed to serialize run report"),
    }
}
