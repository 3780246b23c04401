use std::time::Duration;

use hdrhistogram::Histogram;

use super::Percentiles;

#[derive(Debug)]
pub struct LatencyHistogram {
    hist: Histogram<u64>,
}

impl LatencyHistogram {
    /// Create a new latency histogram with three significant digits.
    ///
    /// # Errors
    ///
    /// Returns an error if the histogram cannot be created.
    pub fn new() -> Result<Self, String> {
        let hist = Histogram::<u64>::new(3)
            .map_err(|err| format!("Failed to create histogram: {}", err))?;
        Ok(Self { hist })
    }

    /// Record a latency value in milliseconds. Sub-millisecond values count as 1 ms.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be recorded.
    pub fn record(&mut self, latency_ms: u64) -> Result<(), String> {
        let value = latency_ms.max(1);
        self.hist
            .record(value)
            .map_err(|err| format!("Failed to record latency: {}", err))
    }

    /// # Errors
    ///
    /// Returns an error if the value cannot be recorded.
    pub fn record_duration(&mut self, latency: Duration) -> Result<(), String> {
        self.record(u64::try_from(latency.as_millis()).unwrap_or(u64::MAX))
    }

    /// p50/p90/p99 in milliseconds, `None` when nothing was recorded.
    #[must_use]
    pub fn percentiles(&self) -> Option<Percentiles> {
        if self.count() == 0 {
            return None;
        }

        Some(Percentiles {
            p50_ms: self.hist.value_at_quantile(0.5),
            p90_ms: self.hist.value_at_quantile(0.9),
            p99_ms: self.hist.value_at_quantile(0.99),
        })
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.hist.len()
    }
}
