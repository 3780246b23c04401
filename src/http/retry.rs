use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tracing::{debug, warn};

use crate::domain::{RequestSpec, Response};
use crate::error::AttemptError;
use crate::history::HistoryStore;

use super::transport::Transport;
use super::verify::verify;

/// Upper bound added on top of the base delay before jitter.
pub const MAX_BACKOFF_CEILING: Duration = Duration::from_secs(30);

/// Suspends a unit between attempts.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Collaborators shared by every unit of an execution.
#[derive(Clone)]
pub struct SendContext {
    pub transport: Arc<dyn Transport>,
    pub sleeper: Arc<dyn Sleeper>,
    pub history: Option<Arc<dyn HistoryStore>>,
}

impl SendContext {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            sleeper: Arc::new(TokioSleeper),
            history: None,
        }
    }

    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    #[must_use]
    pub fn with_history(mut self, history: Arc<dyn HistoryStore>) -> Self {
        self.history = Some(history);
        self
    }
}

/// Result of one send plus verification.
#[derive(Debug)]
pub struct Attempt {
    pub response: Option<Response>,
    pub error: Option<AttemptError>,
}

impl Attempt {
    #[must_use]
    pub const fn ok(&self) -> bool {
        self.response.is_some() && self.error.is_none()
    }
}

/// Final state of one unit of work after its retry loop.
#[derive(Debug)]
pub struct UnitOutcome {
    /// Last response received, if any attempt produced one.
    pub response: Option<Response>,
    pub ok: bool,
    /// Reason the last attempt failed; `None` when `ok`.
    pub error: Option<AttemptError>,
    pub attempts: u32,
}

impl UnitOutcome {
    /// Round-trip duration of the last response.
    #[must_use]
    pub fn duration(&self) -> Option<Duration> {
        self.response.as_ref().map(|response| response.duration)
    }
}

/// `min(base * 2^attempt, base + MAX_BACKOFF_CEILING)`, saturating.
#[must_use]
pub fn backoff_cap(base: Duration, attempt: u32) -> Duration {
    let factor = 1_u32.checked_shl(attempt).unwrap_or(u32::MAX);
    let exponential = base.checked_mul(factor).unwrap_or(Duration::MAX);
    exponential.min(base.saturating_add(MAX_BACKOFF_CEILING))
}

/// Capped exponential delay plus uniform jitter in `[0, cap)`.
#[must_use]
pub fn backoff_delay<R>(base: Duration, attempt: u32, rng: &mut R) -> Duration
where
    R: Rng + ?Sized,
{
    let capped = backoff_cap(base, attempt);
    let capped_nanos = u64::try_from(capped.as_nanos()).unwrap_or(u64::MAX);
    if capped_nanos == 0 {
        return Duration::ZERO;
    }
    let jitter = rng.gen_range(0..capped_nanos);
    capped.saturating_add(Duration::from_nanos(jitter))
}

/// One attempt: send, then verify when assertions are configured.
pub async fn send_and_verify(context: &SendContext, request: &RequestSpec) -> Attempt {
    match context.transport.send(request).await {
        Ok(response) => {
            let error = request
                .assertions
                .as_ref()
                .and_then(|assertions| verify(&response, assertions).err())
                .map(AttemptError::from);
            Attempt {
                response: Some(response),
                error,
            }
        }
        Err(err) => Attempt {
            response: None,
            error: Some(AttemptError::from(err)),
        },
    }
}

/// Runs up to `request.attempts()` attempts with exponential backoff between them.
///
/// Only transport errors and failed assertions are retried. Every received
/// response is written to the history store before the next decision.
pub async fn send_with_retries(context: &SendContext, request: &RequestSpec) -> UnitOutcome {
    let attempts = request.attempts();
    let mut last = Attempt {
        response: None,
        error: None,
    };

    for attempt in 0..attempts {
        let current = send_and_verify(context, request).await;

        if let (Some(history), Some(response)) =
            (context.history.as_ref(), current.response.as_ref())
            && let Err(err) = history.save(response).await
        {
            debug!("Failed to persist last response: {}", err);
        }

        if current.ok() {
            return UnitOutcome {
                response: current.response,
                ok: true,
                error: None,
                attempts: attempt.saturating_add(1),
            };
        }

        let next = attempt.saturating_add(1);
        if next < attempts {
            let delay = backoff_delay(request.backoff, attempt, &mut rand::thread_rng());
            if let Some(err) = current.error.as_ref() {
                warn!(
                    "Attempt {}/{} failed: {}. Retrying in {:?}",
                    next, attempts, err, delay
                );
            }
            if !delay.is_zero() {
                context.sleeper.sleep(delay).await;
            }
        }
        last = current;
    }

    UnitOutcome {
        response: last.response,
        ok: false,
        error: last.error,
        attempts,
    }
}
