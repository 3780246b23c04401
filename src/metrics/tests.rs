use std::time::Duration;

use super::*;
use crate::domain::{Multimap, Response};
use crate::http::UnitOutcome;

fn outcome(ok: bool, duration_ms: Option<u64>) -> UnitOutcome {
    UnitOutcome {
        response: duration_ms.map(|ms| {
            Response::new(200, Multimap::new(), Vec::new(), Duration::from_millis(ms))
        }),
        ok,
        error: None,
        attempts: 1,
    }
}

#[test]
fn successful_durations_drive_min_max_avg() -> Result<(), String> {
    let outcomes = [
        outcome(true, Some(10)),
        outcome(true, Some(20)),
        outcome(true, Some(30)),
    ];
    let result = BenchmarkResult::from_outcomes(&outcomes);
    if result.total != 3 || result.successes != 3 || result.failures != 0 {
        return Err(format!("Unexpected counts: {:?}", result));
    }
    if result.min() != Some(Duration::from_millis(10)) {
        return Err(format!("Unexpected min {:?}", result.min()));
    }
    if result.max() != Some(Duration::from_millis(30)) {
        return Err(format!("Unexpected max {:?}", result.max()));
    }
    if result.avg() != Some(Duration::from_millis(20)) {
        return Err(format!("Unexpected avg {:?}", result.avg()));
    }
    Ok(())
}

#[test]
fn failed_units_do_not_contribute_durations() -> Result<(), String> {
    let outcomes = [
        outcome(true, Some(10)),
        outcome(false, Some(500)),
        outcome(false, None),
    ];
    let result = BenchmarkResult::from_outcomes(&outcomes);
    if result.successes != 1 || result.failures != 2 || result.total != 3 {
        return Err(format!("Unexpected counts: {:?}", result));
    }
    if result.max() != Some(Duration::from_millis(10)) {
        return Err(format!("Failure duration leaked into max: {:?}", result.max()));
    }
    Ok(())
}

#[test]
fn zero_successes_report_no_latency() -> Result<(), String> {
    let result = BenchmarkResult::from_outcomes(&[outcome(false, None), outcome(false, None)]);
    if result.min().is_some() || result.max().is_some() || result.avg().is_some() {
        return Err(format!("Expected N/A latencies: {:?}", result));
    }
    if result.percentiles().is_some() {
        return Err("Expected no percentiles".to_owned());
    }
    if result.success_rate_x100() != 0 {
        return Err(format!("Unexpected success rate {}", result.success_rate_x100()));
    }
    Ok(())
}

#[test]
fn throughput_uses_wall_clock_elapsed() -> Result<(), String> {
    let mut result = BenchmarkResult::default();
    for _ in 0..50 {
        result.record(true, Some(Duration::from_millis(5)));
    }
    let throughput = result.throughput_x100(Duration::from_secs(2));
    if throughput != 2_500 {
        return Err(format!("Expected 25.00 req/s, got {}", throughput));
    }
    if BenchmarkResult::default().throughput_x100(Duration::ZERO) != 0 {
        return Err("Empty run should have zero throughput".to_owned());
    }
    Ok(())
}

#[test]
fn success_rate_is_scaled_by_100() -> Result<(), String> {
    let mut result = BenchmarkResult::default();
    result.record(true, Some(Duration::from_millis(1)));
    result.record(true, Some(Duration::from_millis(1)));
    result.record(true, Some(Duration::from_millis(1)));
    result.record(false, None);
    if result.success_rate_x100() != 7_500 {
        return Err(format!("Unexpected success rate {}", result.success_rate_x100()));
    }
    Ok(())
}

#[test]
fn percentiles_follow_recorded_latencies() -> Result<(), String> {
    let mut result = BenchmarkResult::default();
    for ms in 1..=100 {
        result.record(true, Some(Duration::from_millis(ms)));
    }
    let percentiles = result
        .percentiles()
        .ok_or_else(|| "Expected percentiles".to_owned())?;
    let within = |value: u64, expected: u64| value.abs_diff(expected) <= 1;
    if !within(percentiles.p50_ms, 50)
        || !within(percentiles.p90_ms, 90)
        || !within(percentiles.p99_ms, 99)
    {
        return Err(format!("Unexpected percentiles {:?}", percentiles));
    }
    Ok(())
}

#[test]
fn histogram_clamps_sub_millisecond_values() -> Result<(), String> {
    let mut histogram = LatencyHistogram::new()?;
    histogram.record_duration(Duration::from_micros(200))?;
    let percentiles = histogram
        .percentiles()
        .ok_or_else(|| "Expected percentiles".to_owned())?;
    if percentiles.p50_ms != 1 || histogram.count() != 1 {
        return Err(format!("Unexpected percentiles {:?}", percentiles));
    }
    Ok(())
}
