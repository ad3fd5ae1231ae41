use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::mpsc;
use tracing::debug;

use crate::domain::ProbeOutcome;
use crate::http::Prober;

/// Units of work not yet claimed by any worker.
///
/// Workers pull one unit at a time, so fast workers take more of the batch
/// and every unit is claimed exactly once.
#[derive(Debug)]
pub(super) struct WorkQueue {
    remaining: AtomicUsize,
}

impl WorkQueue {
    pub(super) const fn new(units: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(units),
        }
    }

    pub(super) fn try_take(&self) -> bool {
        self.remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                current.checked_sub(1)
            })
            .is_ok()
    }

    #[cfg(test)]
    pub(super) fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Acquire)
    }
}

/// Probes `url` until the queue is empty, forwarding every outcome.
///
/// Returns the number of outcomes this worker delivered.
pub(super) async fn run_worker(
    worker_id: usize,
    prober: Prober,
    url: Arc<str>,
    queue: Arc<WorkQueue>,
    outcomes_tx: mpsc::Sender<ProbeOutcome>,
) -> usize {
    let mut delivered: usize = 0;
    while queue.try_take() {
        let outcome = prober.probe(&url).await;
        if outcomes_tx.send(outcome).await.is_err() {
            debug!("Worker {} stopping: outcome receiver closed", worker_id);
            break;
        }
        delivered = delivered.saturating_add(1);
    }
    debug!("Worker {} finished after {} probe(s)", worker_id, delivered);
    delivered
}
