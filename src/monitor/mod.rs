//! Entry point tying the prober, result store and notifier together.

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::domain::{LoadTestSummary, ProbeOutcome};
use crate::error::{AppError, AppResult, ValidationError};
use crate::http::Prober;
use crate::load::{LoadDefaults, LoadOrchestrator};
use crate::notify::{EventKind, Notifier};
use crate::store::ResultStore;

/// Runs quick probes and load tests, records them and announces completion.
///
/// All collaborators are injected; clones share them.
#[derive(Clone)]
pub struct Monitor {
    prober: Prober,
    store: Arc<dyn ResultStore>,
    orchestrator: LoadOrchestrator,
    notifier: Notifier,
}

impl Monitor {
    #[must_use]
    pub fn new(
        prober: Prober,
        store: Arc<dyn ResultStore>,
        notifier: Notifier,
        defaults: LoadDefaults,
    ) -> Self {
        let orchestrator = LoadOrchestrator::new(prober.clone(), Arc::clone(&store), defaults);
        Self {
            prober,
            store,
            orchestrator,
            notifier,
        }
    }

    /// Probes `url` once, stores the outcome and publishes a `test_result`
    /// event.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingUrl` for an empty URL, or a store
    /// error. Transport failures are reported inside the outcome.
    pub async fn run_quick_probe(&self, url: &str) -> AppResult<ProbeOutcome> {
        let url = require_url(url)?;
        let outcome = self.prober.probe(url).await;
        info!(
            "Quick probe {} -> status {} in {}ms",
            url, outcome.status, outcome.duration_ms
        );
        self.store.save_outcome(outcome.clone()).await?;
        self.announce(EventKind::TestResult, &outcome);
        Ok(outcome)
    }

    /// Runs a load test, stores the summary and publishes a
    /// `load_test_result` event. Zero counts select the configured defaults.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingUrl` for an empty URL, a worker-pool
    /// failure, or a store error.
    pub async fn run_load(
        &self,
        url: &str,
        total_requests: usize,
        concurrency: usize,
    ) -> AppResult<LoadTestSummary> {
        let url = require_url(url)?;
        let summary = self
            .orchestrator
            .run_load(url, total_requests, concurrency)
            .await?;
        self.announce(EventKind::LoadTestResult, &summary);
        Ok(summary)
    }

    /// Starts a load test in the background. Completion is also published
    /// through the notifier.
    #[must_use]
    pub fn spawn_load(
        &self,
        url: impl Into<String>,
        total_requests: usize,
        concurrency: usize,
    ) -> JoinHandle<AppResult<LoadTestSummary>> {
        let monitor = self.clone();
        let url = url.into();
        tokio::spawn(async move { monitor.run_load(&url, total_requests, concurrency).await })
    }

    /// # Errors
    ///
    /// Returns an error when the store cannot be read.
    pub async fn list_outcomes(&self, limit: usize) -> AppResult<Vec<ProbeOutcome>> {
        self.store.list_outcomes(limit).await
    }

    /// # Errors
    ///
    /// Returns an error when the store cannot be read.
    pub async fn list_summaries(&self, limit: usize) -> AppResult<Vec<LoadTestSummary>> {
        self.store.list_summaries(limit).await
    }

    /// # Errors
    ///
    /// Returns an error when the store cannot be read.
    pub async fn get_summary(&self, id: &str) -> AppResult<Option<LoadTestSummary>> {
        self.store.get_summary(id).await
    }

    #[must_use]
    pub const fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    fn announce<T>(&self, kind: EventKind, data: &T)
    where
        T: Serialize,
    {
        if let Err(err) = self.notifier.publish(kind, data) {
            error!("Failed to publish '{}' event: {}", kind.as_str(), err);
        }
    }
}

fn require_url(url: &str) -> AppResult<&str> {
    let url = url.trim();
    if url.is_empty() {
        error!("Missing URL.");
        return Err(AppError::validation(ValidationError::MissingUrl));
    }
    Ok(url)
}
