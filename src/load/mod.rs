//! Load-test orchestration: a pull-model worker pool over one target URL.
mod aggregate;
mod plan;
mod worker;


use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::{LoadTestSummary, ProbeOutcome};
use crate::error::{AppError, AppResult, LoadError};
use crate::http::Prober;
use crate::store::ResultStore;

pub use plan::{DEFAULT_CONCURRENCY, DEFAULT_TOTAL_REQUESTS, LoadDefaults, LoadPlan};
use worker::{WorkQueue, run_worker};

const MAX_OUTCOME_BUFFER: usize = 1024;
/// Upper bound on up-front capacity for the worker-handle and outcome vectors.
const MAX_PREALLOCATION: usize = 65_536;

/// Runs batches of probes through `concurrency` workers and persists the
/// resulting summaries.
#[derive(Clone)]
pub struct LoadOrchestrator {
    prober: Prober,
    store: Arc<dyn ResultStore>,
    defaults: LoadDefaults,
}

impl LoadOrchestrator {
    #[must_use]
    pub fn new(prober: Prober, store: Arc<dyn ResultStore>, defaults: LoadDefaults) -> Self {
        Self {
            prober,
            store,
            defaults,
        }
    }

    /// Issues `total_requests` GET probes against `url` with at most
    /// `concurrency` in flight, then stores and returns the summary.
    ///
    /// Zero counts fall back to the configured defaults. Probe failures are
    /// recorded in the summary and never abort the batch.
    ///
    /// # Errors
    ///
    /// Returns an error when a worker task dies or the summary cannot be
    /// stored.
    pub async fn run_load(
        &self,
        url: &str,
        total_requests: usize,
        concurrency: usize,
    ) -> AppResult<LoadTestSummary> {
        let plan = LoadPlan::resolve(total_requests, concurrency, self.defaults);
        let batch_id = Uuid::new_v4().to_string();
        info!(
            "Starting load test {} against {} ({} requests, concurrency {})",
            batch_id, url, plan.total_requests, plan.concurrency
        );

        let start = Instant::now();
        let results = self.collect_outcomes(&batch_id, url, plan).await?;
        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        let stats = aggregate::reduce(&results);
        let summary = LoadTestSummary {
            id: batch_id,
            url: url.to_owned(),
            total_requests: plan.total_requests,
            concurrency: plan.concurrency,
            duration_ms,
            success_count: stats.success_count,
            error_count: stats.error_count,
            avg_response_time_ms: stats.avg_ms,
            min_response_time_ms: stats.min_ms,
            max_response_time_ms: stats.max_ms,
            status_codes: stats.status_codes,
            timestamp: Utc::now(),
            results,
        };

        self.store.save_summary(summary.clone()).await?;
        info!(
            "Load test {} finished in {}ms: {} ok, {} failed",
            summary.id, summary.duration_ms, summary.success_count, summary.error_count
        );
        Ok(summary)
    }

    /// Drives the worker pool and records outcomes in completion order,
    /// naming each `{batch_id}-{position}`.
    async fn collect_outcomes(
        &self,
        batch_id: &str,
        url: &str,
        plan: LoadPlan,
    ) -> AppResult<Vec<ProbeOutcome>> {
        let queue = Arc::new(WorkQueue::new(plan.total_requests));
        let target: Arc<str> = Arc::from(url);
        let buffer = plan.concurrency.clamp(1, MAX_OUTCOME_BUFFER);
        let (outcomes_tx, mut outcomes_rx) = mpsc::channel::<ProbeOutcome>(buffer);

        let mut worker_handles = Vec::with_capacity(plan.concurrency.min(MAX_PREALLOCATION));
        for worker_id in 0..plan.concurrency {
            worker_handles.push(tokio::spawn(run_worker(
                worker_id,
                self.prober.clone(),
                Arc::clone(&target),
                Arc::clone(&queue),
                outcomes_tx.clone(),
            )));
        }
        drop(outcomes_tx);

        let mut results =
            Vec::with_capacity(plan.total_requests.min(MAX_PREALLOCATION));
        while let Some(outcome) = outcomes_rx.recv().await {
            let position = results.len();
            results.push(outcome.with_id(format!("{}-{}", batch_id, position)));
        }

        for handle in worker_handles {
            if let Err(err) = handle.await {
                error!("Load test {} worker failed: {}", batch_id, err);
                return Err(AppError::load(LoadError::WorkerPool { source: err }));
            }
        }

        Ok(results)
    }
}
