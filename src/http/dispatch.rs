use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::debug;

use crate::domain::RequestSpec;
use crate::error::AppResult;

use super::retry::{SendContext, UnitOutcome, send_with_retries};

/// Shared counter of units still to be claimed.
#[derive(Debug)]
pub struct WorkQueue {
    limit: usize,
    claimed: AtomicUsize,
}

impl WorkQueue {
    #[must_use]
    pub const fn new(limit: usize) -> Self {
        Self {
            limit,
            claimed: AtomicUsize::new(0),
        }
    }

    /// Reserves one unit. Returns `false` once all units have been handed out.
    pub fn try_claim(&self) -> bool {
        loop {
            let current = self.claimed.load(Ordering::Relaxed);
            if current >= self.limit {
                return false;
            }
            let Some(next) = current.checked_add(1) else {
                return false;
            };
            if self
                .claimed
                .compare_exchange(current, next, Ordering::Relaxed, Ordering::Relaxed)
                .is_ok()
            {
                return true;
            }
        }
    }

    #[must_use]
    pub fn claimed(&self) -> usize {
        self.claimed.load(Ordering::Relaxed).min(self.limit)
    }
}

/// Every unit outcome of one dispatch, in completion order, plus wall-clock time.
#[derive(Debug)]
pub struct DispatchReport {
    pub outcomes: Vec<UnitOutcome>,
    pub elapsed: Duration,
}

/// Runs `request.repeat` units over `request.workers` tasks.
///
/// Workers pull units from a shared queue until it is empty, so a fast
/// worker may run more units than a slow one. Exactly `repeat` outcomes are
/// returned.
///
/// # Errors
///
/// Returns an error when a worker task panics.
pub async fn dispatch(
    context: &SendContext,
    request: Arc<RequestSpec>,
) -> AppResult<DispatchReport> {
    let total = request.repeat.get();
    let workers = request.workers.get().min(total);
    let queue = Arc::new(WorkQueue::new(total));
    let finished = Arc::new(AtomicUsize::new(0));
    let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel::<UnitOutcome>();

    debug!(
        "Dispatching {} request(s) over {} worker(s) to {}",
        total, workers, request.url
    );
    let start = Instant::now();
    let mut handles = Vec::with_capacity(workers);
    for worker_id in 0..workers {
        let context = context.clone();
        let request = Arc::clone(&request);
        let queue = Arc::clone(&queue);
        let finished = Arc::clone(&finished);
        let outcome_tx = outcome_tx.clone();

        handles.push(tokio::spawn(async move {
            while queue.try_claim() {
                let outcome = send_with_retries(&context, &request).await;
                let number = finished.fetch_add(1, Ordering::Relaxed).saturating_add(1);
                log_unit(number, total, worker_id, &outcome);
                if outcome_tx.send(outcome).is_err() {
                    break;
                }
            }
        }));
    }
    drop(outcome_tx);

    for handle in handles {
        handle.await?;
    }
    let elapsed = start.elapsed();

    let mut outcomes = Vec::with_capacity(total);
    while let Some(outcome) = outcome_rx.recv().await {
        outcomes.push(outcome);
    }

    Ok(DispatchReport { outcomes, elapsed })
}

fn log_unit(number: usize, total: usize, worker_id: usize, outcome: &UnitOutcome) {
    match (outcome.response.as_ref(), outcome.error.as_ref()) {
        (Some(response), None) => debug!(
            "Request {}/{} [worker {}]: {} ({:?})",
            number, total, worker_id, response.status, response.duration
        ),
        (Some(response), Some(err)) => debug!(
            "Request {}/{} [worker {}]: {} failed: {}",
            number, total, worker_id, response.status, err
        ),
        (None, Some(err)) => debug!(
            "Request {}/{} [worker {}]: failed: {}",
            number, total, worker_id, err
        ),
        (None, None) => debug!(
            "Request {}/{} [worker {}]: no response",
            number, total, worker_id
        ),
    }
}
