use std::time::Duration;

use tracing::warn;

use crate::http::UnitOutcome;

use super::LatencyHistogram;

const MICROS_PER_SECOND: u128 = 1_000_000;

/// Latency percentiles in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Percentiles {
    pub p50_ms: u64,
    pub p90_ms: u64,
    pub p99_ms: u64,
}

/// Counts and successful-unit durations of one benchmark run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BenchmarkResult {
    pub total: usize,
    pub successes: usize,
    pub failures: usize,
    /// Round-trip durations of successful units only.
    pub durations: Vec<Duration>,
}

impl BenchmarkResult {
    #[must_use]
    pub fn from_outcomes(outcomes: &[UnitOutcome]) -> Self {
        let mut result = Self::default();
        for outcome in outcomes {
            result.record(outcome.ok, outcome.duration());
        }
        result
    }

    /// Adds one unit. The duration is kept only for successful units.
    pub fn record(&mut self, ok: bool, duration: Option<Duration>) {
        self.total = self.total.saturating_add(1);
        if ok {
            self.successes = self.successes.saturating_add(1);
            if let Some(duration) = duration {
                self.durations.push(duration);
            }
        } else {
            self.failures = self.failures.saturating_add(1);
        }
    }

    #[must_use]
    pub fn min(&self) -> Option<Duration> {
        self.durations.iter().min().copied()
    }

    #[must_use]
    pub fn max(&self) -> Option<Duration> {
        self.durations.iter().max().copied()
    }

    #[must_use]
    pub fn avg(&self) -> Option<Duration> {
        let count = u32::try_from(self.durations.len()).ok()?;
        let sum = self
            .durations
            .iter()
            .try_fold(Duration::ZERO, |acc, value| acc.checked_add(*value))?;
        sum.checked_div(count)
    }

    /// Requests per second over `elapsed`, multiplied by 100.
    #[must_use]
    pub fn throughput_x100(&self, elapsed: Duration) -> u64 {
        if self.total == 0 {
            return 0;
        }
        let elapsed_us = elapsed.as_micros().max(1);
        let total = u128::try_from(self.total).unwrap_or(u128::MAX);
        let scaled = total
            .saturating_mul(100)
            .saturating_mul(MICROS_PER_SECOND)
            .checked_div(elapsed_us)
            .unwrap_or(0);
        u64::try_from(scaled).unwrap_or(u64::MAX)
    }

    /// Share of successful units, multiplied by 100 (`9950` = 99.50%).
    #[must_use]
    pub fn success_rate_x100(&self) -> u64 {
        if self.total == 0 {
            return 0;
        }
        let scaled = u128::try_from(self.successes)
            .unwrap_or(u128::MAX)
            .saturating_mul(10_000)
            .checked_div(u128::try_from(self.total).unwrap_or(u128::MAX))
            .unwrap_or(0);
        u64::try_from(scaled).unwrap_or(u64::MAX)
    }

    #[must_use]
    pub fn percentiles(&self) -> Option<Percentiles> {
        let mut histogram = match LatencyHistogram::new() {
            Ok(histogram) => histogram,
            Err(err) => {
                warn!("{}", err);
                return None;
            }
        };
        for duration in &self.durations {
            if let Err(err) = histogram.record_duration(*duration) {
                warn!("{}", err);
                return None;
            }
        }
        histogram.percentiles()
    }
}
