use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ProbeOutcome;

/// Aggregate over one load-test batch.
///
/// `results` is ordered by completion. `success_count + error_count`,
/// the histogram total and `results.len()` all equal `total_requests` once
/// the batch finishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadTestSummary {
    pub id: String,
    pub url: String,
    pub total_requests: usize,
    pub concurrency: usize,
    #[serde(rename = "duration")]
    pub duration_ms: u64,
    pub success_count: usize,
    pub error_count: usize,
    #[serde(rename = "avg_response_time")]
    pub avg_response_time_ms: f64,
    #[serde(rename = "min_response_time")]
    pub min_response_time_ms: u64,
    #[serde(rename = "max_response_time")]
    pub max_response_time_ms: u64,
    pub status_codes: BTreeMap<u16, usize>,
    pub timestamp: DateTime<Utc>,
    pub results: Vec<ProbeOutcome>,
}

impl LoadTestSummary {
    /// Success rate in hundredths of a percent (`10_000` is 100%).
    #[must_use]
    pub fn success_rate_x100(&self) -> u64 {
        let total = u128::try_from(self.total_requests).unwrap_or(u128::MAX);
        let success = u128::try_from(self.success_count).unwrap_or(0);
        if total == 0 {
            return 0;
        }
        let scaled = success
            .saturating_mul(10_000)
            .checked_div(total)
            .unwrap_or(0);
        u64::try_from(scaled).map_or(u64::MAX, |value| value)
    }
}
