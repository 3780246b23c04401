//! Benchmark aggregation and latency histogram utilities.
mod benchmark;
mod histogram;

#[cfg(test)]
mod tests;

pub use benchmark::{BenchmarkResult, Percentiles};
pub use histogram::LatencyHistogram;
