//! Bounded history of probe outcomes and load-test summaries.
//!
//! Both collections evict first-in-first-out once full, synchronously inside
//! the save call. Summary lookup by id follows the same cut: an evicted
//! summary is no longer reachable.
mod memory;
mod sqlite;

#[cfg(test)]
mod tests;

use std::num::NonZeroUsize;

use async_trait::async_trait;

use crate::domain::{LoadTestSummary, ProbeOutcome};
use crate::error::AppResult;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

pub const DEFAULT_OUTCOME_CAPACITY: NonZeroUsize = nonzero(1000);
pub const DEFAULT_SUMMARY_CAPACITY: NonZeroUsize = nonzero(100);
/// Window returned by `list_outcomes(0)`.
pub const DEFAULT_OUTCOME_LIST_LIMIT: usize = 100;
/// Window returned by `list_summaries(0)`.
pub const DEFAULT_SUMMARY_LIST_LIMIT: usize = 50;

const fn nonzero(value: usize) -> NonZeroUsize {
    match NonZeroUsize::new(value) {
        Some(value) => value,
        None => NonZeroUsize::MIN,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreLimits {
    pub outcome_capacity: NonZeroUsize,
    pub summary_capacity: NonZeroUsize,
}

impl Default for StoreLimits {
    fn default() -> Self {
        Self {
            outcome_capacity: DEFAULT_OUTCOME_CAPACITY,
            summary_capacity: DEFAULT_SUMMARY_CAPACITY,
        }
    }
}

/// Storage contract shared by the in-memory and SQLite stores.
///
/// Lists return the most recent `min(limit, count)` entries, oldest first;
/// a `limit` of 0 selects the default window.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// # Errors
    ///
    /// Returns an error when a persistent backend fails to write.
    async fn save_outcome(&self, outcome: ProbeOutcome) -> AppResult<()>;

    /// # Errors
    ///
    /// Returns an error when a persistent backend fails to write.
    async fn save_summary(&self, summary: LoadTestSummary) -> AppResult<()>;

    /// # Errors
    ///
    /// Returns an error when a persistent backend fails to read.
    async fn list_outcomes(&self, limit: usize) -> AppResult<Vec<ProbeOutcome>>;

    /// # Errors
    ///
    /// Returns an error when a persistent backend fails to read.
    async fn list_summaries(&self, limit: usize) -> AppResult<Vec<LoadTestSummary>>;

    /// Looks up a retained summary; `None` when unknown or evicted.
    ///
    /// # Errors
    ///
    /// Returns an error when a persistent backend fails to read.
    async fn get_summary(&self, id: &str) -> AppResult<Option<LoadTestSummary>>;
}

pub(crate) const fn resolve_limit(limit: usize, default: usize) -> usize {
    if limit == 0 { default } else { limit }
}
