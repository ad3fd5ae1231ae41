use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::{LoadTestSummary, ProbeOutcome};
use crate::error::AppResult;

use super::{
    DEFAULT_OUTCOME_LIST_LIMIT, DEFAULT_SUMMARY_LIST_LIMIT, ResultStore, StoreLimits,
    resolve_limit,
};

/// Process-memory store. Each collection sits behind its own read/write
/// lock, so a reader sees a collection either before or after a save.
#[derive(Debug)]
pub struct MemoryStore {
    outcomes: RwLock<BoundedLog<ProbeOutcome>>,
    summaries: RwLock<SummaryLog>,
}

impl MemoryStore {
    #[must_use]
    pub fn new(limits: StoreLimits) -> Self {
        Self {
            outcomes: RwLock::new(BoundedLog::new(limits.outcome_capacity.get())),
            summaries: RwLock::new(SummaryLog {
                log: BoundedLog::new(limits.summary_capacity.get()),
                by_id: HashMap::new(),
            }),
        }
    }

    fn push_outcome(&self, outcome: ProbeOutcome) {
        let mut outcomes = self
            .outcomes
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(evicted) = outcomes.push(outcome) {
            debug!("Evicted probe outcome {}", evicted.id);
        }
    }

    fn push_summary(&self, summary: LoadTestSummary) {
        let mut summaries = self
            .summaries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let summary = Arc::new(summary);
        summaries
            .by_id
            .insert(summary.id.clone(), Arc::clone(&summary));
        if let Some(evicted) = summaries.log.push(summary) {
            // A re-saved id may already point at a newer entry.
            let stale = summaries
                .by_id
                .get(&evicted.id)
                .is_some_and(|current| Arc::ptr_eq(current, &evicted));
            if stale {
                summaries.by_id.remove(&evicted.id);
            }
            debug!("Evicted load test summary {}", evicted.id);
        }
    }

    fn recent_outcomes(&self, limit: usize) -> Vec<ProbeOutcome> {
        let outcomes = self
            .outcomes
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        outcomes
            .recent(resolve_limit(limit, DEFAULT_OUTCOME_LIST_LIMIT))
            .cloned()
            .collect()
    }

    fn recent_summaries(&self, limit: usize) -> Vec<LoadTestSummary> {
        let summaries = self
            .summaries
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        summaries
            .log
            .recent(resolve_limit(limit, DEFAULT_SUMMARY_LIST_LIMIT))
            .map(|summary| summary.as_ref().clone())
            .collect()
    }

    fn summary_by_id(&self, id: &str) -> Option<LoadTestSummary> {
        let summaries = self
            .summaries
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        summaries
            .by_id
            .get(id)
            .map(|summary| summary.as_ref().clone())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(StoreLimits::default())
    }
}

#[async_trait]
impl ResultStore for MemoryStore {
    async fn save_outcome(&self, outcome: ProbeOutcome) -> AppResult<()> {
        self.push_outcome(outcome);
        Ok(())
    }

    async fn save_summary(&self, summary: LoadTestSummary) -> AppResult<()> {
        self.push_summary(summary);
        Ok(())
    }

    async fn list_outcomes(&self, limit: usize) -> AppResult<Vec<ProbeOutcome>> {
        Ok(self.recent_outcomes(limit))
    }

    async fn list_summaries(&self, limit: usize) -> AppResult<Vec<LoadTestSummary>> {
        Ok(self.recent_summaries(limit))
    }

    async fn get_summary(&self, id: &str) -> AppResult<Option<LoadTestSummary>> {
        Ok(self.summary_by_id(id))
    }
}

#[derive(Debug)]
struct SummaryLog {
    log: BoundedLog<Arc<LoadTestSummary>>,
    by_id: HashMap<String, Arc<LoadTestSummary>>,
}

#[derive(Debug)]
struct BoundedLog<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedLog<T> {
    fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    /// Appends `item`, returning the oldest entry when capacity is exceeded.
    fn push(&mut self, item: T) -> Option<T> {
        self.items.push_back(item);
        if self.items.len() > self.capacity {
            self.items.pop_front()
        } else {
            None
        }
    }

    fn recent(&self, limit: usize) -> impl Iterator<Item = &T> {
        let skip = self.items.len().saturating_sub(limit);
        self.items.iter().skip(skip)
    }
}
