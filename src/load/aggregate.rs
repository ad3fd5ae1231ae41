use std::collections::BTreeMap;

use crate::domain::ProbeOutcome;

/// One-pass reduction over a batch's outcomes.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BatchStats {
    pub(crate) success_count: usize,
    pub(crate) error_count: usize,
    pub(crate) avg_ms: f64,
    pub(crate) min_ms: u64,
    pub(crate) max_ms: u64,
    pub(crate) status_codes: BTreeMap<u16, usize>,
}

/// Reduces `outcomes` into batch statistics.
///
/// An empty batch reports zero for every timing instead of dividing by
/// zero.
pub(crate) fn reduce(outcomes: &[ProbeOutcome]) -> BatchStats {
    let mut success_count: usize = 0;
    let mut error_count: usize = 0;
    let mut sum_ms: u128 = 0;
    let mut min_ms = u64::MAX;
    let mut max_ms: u64 = 0;
    let mut status_codes: BTreeMap<u16, usize> = BTreeMap::new();

    for outcome in outcomes {
        if outcome.success {
            success_count = success_count.saturating_add(1);
        } else {
            error_count = error_count.saturating_add(1);
        }
        sum_ms = sum_ms.saturating_add(u128::from(outcome.duration_ms));
        min_ms = min_ms.min(outcome.duration_ms);
        max_ms = max_ms.max(outcome.duration_ms);
        let count = status_codes.entry(outcome.status).or_insert(0);
        *count = count.saturating_add(1);
    }

    if outcomes.is_empty() {
        min_ms = 0;
    }

    BatchStats {
        success_count,
        error_count,
        avg_ms: mean_ms(sum_ms, outcomes.len()),
        min_ms,
        max_ms,
        status_codes,
    }
}

#[expect(clippy::float_arithmetic)]
fn mean_ms(sum_ms: u128, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    sum_ms as f64 / count as f64
}
