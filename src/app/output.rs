use std::time::Duration;

use reqwest::StatusCode;

use crate::domain::{Multimap, RequestSpec, Response};
use crate::metrics::BenchmarkResult;

const NOT_AVAILABLE: &str = "N/A";

/// `200 OK`, `404 Not Found`; bare code when the reason is unknown.
#[must_use]
pub fn status_line(status: u16) -> String {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .map_or_else(|| status.to_string(), |reason| format!("{} {}", status, reason))
}

/// Pretty-prints JSON bodies, falls back to raw (lossy UTF-8) text.
#[must_use]
pub fn format_body(body: &[u8], content_type: &str) -> String {
    if content_type.contains("application/json")
        && let Ok(value) = serde_json::from_slice::<serde_json::Value>(body)
        && let Ok(pretty) = serde_json::to_string_pretty(&value)
    {
        return pretty;
    }
    String::from_utf8_lossy(body).into_owned()
}

/// `->` lines describing the outgoing request.
#[must_use]
pub fn render_request(request: &RequestSpec) -> String {
    to_text(&request_lines(request))
}

/// Status line and body; verbose mode adds the request, headers and timing.
#[must_use]
pub fn render_response(request: &RequestSpec, response: &Response, verbose: bool) -> String {
    let mut lines = Vec::new();
    if verbose {
        lines.extend(request_lines(request));
        lines.push(String::new());
        lines.push(format!("<- {}", status_line(response.status)));
        lines.extend(header_lines("<-", &response.headers));
        lines.push("<-".to_owned());
    } else {
        lines.push(status_line(response.status));
        lines.push(String::new());
    }
    lines.push(format_body(&response.body, &response.content_type));
    if verbose {
        lines.push(String::new());
        lines.push(format!("Duration: {:.2?}", response.duration));
    }
    to_text(&lines)
}

#[must_use]
pub fn render_benchmark(result: &BenchmarkResult, elapsed: Duration, workers: usize) -> String {
    let throughput = result.throughput_x100(elapsed);
    let success_rate = result.success_rate_x100();
    let percentiles = result.percentiles().map_or_else(
        || NOT_AVAILABLE.to_owned(),
        |percentiles| {
            format!(
                "{}ms / {}ms / {}ms",
                percentiles.p50_ms, percentiles.p90_ms, percentiles.p99_ms
            )
        },
    );

    to_text(&[
        format!("Requests:    {}", result.total),
        format!(
            "Success:     {} ({}.{:02}%)",
            result.successes,
            success_rate / 100,
            success_rate % 100
        ),
        format!("Failures:    {}", result.failures),
        format!("Total time:  {:.2?}", elapsed),
        format!("Avg:         {}", format_optional(result.avg())),
        format!("Min:         {}", format_optional(result.min())),
        format!("Max:         {}", format_optional(result.max())),
        format!("P50/P90/P99: {}", percentiles),
        format!(
            "Throughput:  {}.{:02} req/s",
            throughput / 100,
            throughput % 100
        ),
        format!("Workers:     {}", workers),
    ])
}

pub fn print_request(request: &RequestSpec) {
    print!("{}", render_request(request));
}

pub fn print_response(request: &RequestSpec, response: &Response, verbose: bool) {
    print!("{}", render_response(request, response, verbose));
}

pub fn print_benchmark(result: &BenchmarkResult, elapsed: Duration, workers: usize) {
    print!("{}", render_benchmark(result, elapsed, workers));
}

fn format_optional(value: Option<Duration>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_owned(), |duration| format!("{:.2?}", duration))
}

fn request_lines(request: &RequestSpec) -> Vec<String> {
    let target = request.url.query().map_or_else(
        || request.url.path().to_owned(),
        |query| format!("{}?{}", request.url.path(), query),
    );
    let mut lines = vec![
        format!("-> {} {}", request.method, target),
        format!("-> Host: {}", host_with_port(request)),
    ];
    lines.extend(header_lines("->", &request.headers));
    lines.push("->".to_owned());
    if !request.body.is_empty() {
        lines.push(format_body(
            &request.body,
            request.content_type().unwrap_or_default(),
        ));
    }
    lines
}

fn host_with_port(request: &RequestSpec) -> String {
    let host = request.url.host_str().unwrap_or_default();
    request
        .url
        .port()
        .map_or_else(|| host.to_owned(), |port| format!("{}:{}", host, port))
}

fn header_lines(prefix: &str, headers: &Multimap) -> Vec<String> {
    headers
        .iter()
        .map(|(key, values)| format!("{} {}: {}", prefix, key, values.join(", ")))
        .collect()
}

fn to_text(lines: &[String]) -> String {
    let mut text = lines.join("\n");
    text.push('\n');
    text
}
