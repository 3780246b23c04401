use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::domain::{RequestSpec, Response};
use crate::error::{AppError, AppResult, HttpError};
use crate::http::{
    Attempt, SendContext, UnitOutcome, build_header_map, dispatch, send_and_verify,
    send_with_retries,
};
use crate::metrics::BenchmarkResult;

use super::output;

/// What an execution produced once it has been reported.
#[derive(Debug)]
pub enum ExecutionReport {
    Single(UnitOutcome),
    Benchmark {
        result: BenchmarkResult,
        elapsed: Duration,
        workers: usize,
    },
}

/// Sends resolved requests and reports their results.
pub struct Engine {
    context: SendContext,
    verbose: bool,
}

impl Engine {
    #[must_use]
    pub const fn new(context: SendContext, verbose: bool) -> Self {
        Self { context, verbose }
    }

    /// One raw attempt, no verification and no retries.
    ///
    /// # Errors
    ///
    /// Returns the transport error when no response was received.
    pub async fn send(&self, request: &RequestSpec) -> Result<Response, HttpError> {
        self.context.transport.send(request).await
    }

    /// One attempt followed by verification against the request's assertions.
    pub async fn send_and_verify(&self, request: &RequestSpec) -> Attempt {
        send_and_verify(&self.context, request).await
    }

    /// Runs a single request with retries, or a benchmark when `repeat > 1`,
    /// and prints the result.
    ///
    /// # Errors
    ///
    /// Returns an error when the request headers are invalid, a worker panics,
    /// or a single request exhausts its attempts. Benchmarks report failures
    /// in their summary instead.
    pub async fn execute(&self, request: &RequestSpec) -> AppResult<ExecutionReport> {
        build_header_map(&request.headers)?;

        if request.is_benchmark() {
            let workers = request.workers.get();
            let report = dispatch(&self.context, Arc::new(request.clone())).await?;
            let result = BenchmarkResult::from_outcomes(&report.outcomes);
            output::print_benchmark(&result, report.elapsed, workers);
            return Ok(ExecutionReport::Benchmark {
                result,
                elapsed: report.elapsed,
                workers,
            });
        }

        let outcome = send_with_retries(&self.context, request).await;
        if let Some(response) = outcome.response.as_ref() {
            output::print_response(request, response, self.verbose);
        }
        if outcome.ok {
            debug!("Request succeeded after {} attempt(s)", outcome.attempts);
            return Ok(ExecutionReport::Single(outcome));
        }

        Err(single_failure(&outcome))
    }
}

fn single_failure(outcome: &UnitOutcome) -> AppError {
    let cause = outcome
        .error
        .as_ref()
        .map_or_else(|| "unknown error".to_owned(), ToString::to_string);
    let reason = if outcome.response.is_some() {
        format!("response failed verification: {}", cause)
    } else {
        format!("no response obtained: {}", cause)
    };
    AppError::RequestFailed {
        attempts: outcome.attempts,
        reason,
    }
}
