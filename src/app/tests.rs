use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use clap::Parser;
use reqwest::Url;
use tempfile::tempdir;

use super::*;
use crate::args::{HttpMethod, PokeArgs, PositiveUsize};
use crate::domain::{Assertions, Multimap, RequestTemplate, Response};
use crate::error::{AppError, HttpError, ValidationError};
use crate::http::{SendContext, Sleeper, Transport};
use crate::metrics::BenchmarkResult;

struct FixedTransport {
    status: Option<u16>,
}

#[async_trait]
impl Transport for FixedTransport {
    async fn send(&self, _request: &RequestSpec) -> Result<Response, HttpError> {
        match self.status {
            Some(status) => Ok(Response::new(
                status,
                Multimap::new(),
                b"{\"ok\":true}".to_vec(),
                Duration::from_millis(2),
            )),
            None => Err(HttpError::UrlMissingHost {
                url: "http://".to_owned(),
            }),
        }
    }
}

struct NoSleep;

#[async_trait]
impl Sleeper for NoSleep {
    async fn sleep(&self, _duration: Duration) {}
}

fn run_async_test<F>(future: F) -> Result<(), String>
where
    F: std::future::Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))?;
    runtime.block_on(future)
}

fn engine(status: Option<u16>) -> Engine {
    let context =
        SendContext::new(Arc::new(FixedTransport { status })).with_sleeper(Arc::new(NoSleep));
    Engine::new(context, false)
}

fn spec(retries: u32) -> Result<RequestSpec, String> {
    let url = Url::parse("http://example.test/items").map_err(|err| err.to_string())?;
    let mut spec = RequestSpec::new(HttpMethod::Get, url);
    spec.retries = retries;
    spec.backoff = Duration::from_millis(1);
    Ok(spec)
}

fn parse(args: &[&str]) -> Result<PokeArgs, String> {
    let mut argv = vec!["poke"];
    argv.extend_from_slice(args);
    PokeArgs::try_parse_from(argv).map_err(|err| format!("parse failed: {}", err))
}

#[test]
fn flags_build_a_template() -> Result<(), String> {
    let args = parse(&[
        "-H",
        "Authorization: Bearer {{env.TOKEN}}",
        "--expect-status",
        "200",
        "--expect-header",
        "X-Id: 1",
        "--repeat",
        "4",
        "--workers",
        "2",
        "--backoff",
        "500ms",
        "http://localhost:8080/users?page=2",
    ])?;
    let template = template_from_args(&args).map_err(|err| err.to_string())?;
    if template.url != "http://localhost:8080/users?page=2" || template.backoff_ms != 500 {
        return Err(format!("Unexpected template {:?}", template));
    }
    if template.headers.get("Authorization") != Some(&vec!["Bearer {{env.TOKEN}}".to_owned()]) {
        return Err(format!("Unexpected headers {:?}", template.headers));
    }
    let assertions = template
        .assertions
        .as_ref()
        .ok_or_else(|| "Expected assertions".to_owned())?;
    if assertions.status != 200 || assertions.headers.get("X-Id") != Some(&vec!["1".to_owned()]) {
        return Err(format!("Unexpected assertions {:?}", assertions));
    }
    if template.repeat != 4 || template.workers != 2 {
        return Err(format!("Unexpected concurrency {:?}", template));
    }
    Ok(())
}

#[test]
fn flags_without_url_are_rejected() -> Result<(), String> {
    let args = parse(&["-X", "get"])?;
    match template_from_args(&args) {
        Err(AppError::Validation(_)) => Ok(()),
        other => Err(format!("Expected missing URL, got {:?}", other)),
    }
}

#[test]
fn flags_without_checks_have_no_assertions() -> Result<(), String> {
    let args = parse(&["http://localhost"])?;
    let template = template_from_args(&args).map_err(|err| err.to_string())?;
    if template.assertions.is_some() {
        return Err(format!("Unexpected assertions {:?}", template.assertions));
    }
    Ok(())
}

#[test]
fn saved_template_moves_query_and_drops_file_body() -> Result<(), String> {
    let template = RequestTemplate {
        url: "http://localhost/search?q=poke&tag=a&tag=b".to_owned(),
        body: "from file".to_owned(),
        body_file: "payload.json".to_owned(),
        ..RequestTemplate::default()
    };
    let saved = template_for_save(&template, None);
    if saved.url != "http://localhost/search" {
        return Err(format!("Unexpected url {}", saved.url));
    }
    if saved.query_params.get("tag") != Some(&vec!["a".to_owned(), "b".to_owned()]) {
        return Err(format!("Unexpected query {:?}", saved.query_params));
    }
    if !saved.body.is_empty() || saved.body_file != "payload.json" {
        return Err(format!("Unexpected body {:?}", saved));
    }
    Ok(())
}

#[test]
fn saved_template_inlines_stdin_body() -> Result<(), String> {
    let template = RequestTemplate {
        url: "http://localhost/".to_owned(),
        body_stdin: true,
        ..RequestTemplate::default()
    };
    let saved = template_for_save(&template, Some(b"piped".as_slice()));
    if saved.body != "piped" || saved.body_stdin {
        return Err(format!("Unexpected saved template {:?}", saved));
    }
    Ok(())
}

#[test]
fn request_file_round_trip() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("requests").join("create.json");
    let mut template = RequestTemplate {
        method: HttpMethod::Post,
        url: "{{env.BASE}}/users".to_owned(),
        body: r#"{"name":"poke"}"#.to_owned(),
        retries: 3,
        assertions: Some(Assertions {
            status: 201,
            ..Assertions::default()
        }),
        ..RequestTemplate::default()
    };
    template.push_header("Content-Type", "application/json");

    save_request_file(&template, &path).map_err(|err| err.to_string())?;
    let loaded = load_request_file(&path).map_err(|err| err.to_string())?;
    if loaded != template {
        return Err(format!("Round trip changed template: {:?}", loaded));
    }
    Ok(())
}

#[test]
fn request_file_must_be_json() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("request.toml");
    std::fs::write(&path, "url = 'x'").map_err(|err| format!("write failed: {}", err))?;
    match load_request_file(&path) {
        Err(AppError::Validation(ValidationError::RequestFileNotJson { .. })) => Ok(()),
        other => Err(format!("Expected non-JSON request file to be rejected, got {:?}", other)),
    }
}

#[test]
fn content_type_inference() -> Result<(), String> {
    let cases: [(&[u8], &str, Option<&str>); 5] = [
        (b"", "", None),
        (b"{\"a\":1}", "", Some("application/json")),
        (b"<a/>", "body.xml", Some("application/xml")),
        (b"<!DOCTYPE html><p>", "", Some("text/html; charset=utf-8")),
        (b"plain words", "", Some("text/plain; charset=utf-8")),
    ];
    for (body, file, expected) in cases {
        let actual = infer_content_type(body, file);
        if actual != expected {
            return Err(format!("{:?}/{} -> {:?}", body, file, actual));
        }
    }
    Ok(())
}

#[test]
fn explicit_content_type_is_kept() -> Result<(), String> {
    let mut template = RequestTemplate::default();
    template.push_header("content-type", "text/csv");
    apply_default_content_type(&mut template, b"{\"a\":1}");
    if template.headers.len() != 1 || template.headers.contains_key("Content-Type") {
        return Err(format!("Unexpected headers {:?}", template.headers));
    }
    Ok(())
}

#[test]
fn status_lines_use_canonical_reasons() -> Result<(), String> {
    for (status, expected) in [(200, "200 OK"), (404, "404 Not Found"), (599, "599")] {
        let actual = status_line(status);
        if actual != expected {
            return Err(format!("{} -> {}", status, actual));
        }
    }
    Ok(())
}

#[test]
fn json_bodies_are_pretty_printed() -> Result<(), String> {
    let pretty = format_body(br#"{"a":1}"#, "application/json");
    if pretty != "{\n  \"a\": 1\n}" {
        return Err(format!("Unexpected body {:?}", pretty));
    }
    let raw = format_body(b"not json", "application/json");
    if raw != "not json" {
        return Err(format!("Unexpected fallback {:?}", raw));
    }
    Ok(())
}

#[test]
fn benchmark_summary_without_successes_shows_na() -> Result<(), String> {
    let mut result = BenchmarkResult::default();
    result.record(false, None);
    result.record(false, None);
    let summary = render_benchmark(&result, Duration::from_secs(1), 2);
    for expected in [
        "Requests:    2",
        "Failures:    2",
        "Avg:         N/A",
        "Min:         N/A",
        "Max:         N/A",
        "Throughput:  2.00 req/s",
        "Workers:     2",
    ] {
        if !summary.contains(expected) {
            return Err(format!("Missing {:?} in:\n{}", expected, summary));
        }
    }
    Ok(())
}

#[test]
fn dry_run_rendering_shows_method_host_and_body() -> Result<(), String> {
    let mut request = spec(1)?;
    request.method = HttpMethod::Post;
    request.body = br#"{"a":1}"#.to_vec();
    request
        .headers
        .insert("Content-Type".to_owned(), vec!["application/json".to_owned()]);
    let rendered = render_request(&request);
    for expected in [
        "-> POST /items",
        "-> Host: example.test",
        "-> Content-Type: application/json",
        "\"a\": 1",
    ] {
        if !rendered.contains(expected) {
            return Err(format!("Missing {:?} in:\n{}", expected, rendered));
        }
    }
    Ok(())
}

#[test]
fn execute_single_success() -> Result<(), String> {
    run_async_test(async {
        match engine(Some(200)).execute(&spec(2)?).await {
            Ok(ExecutionReport::Single(outcome)) if outcome.ok && outcome.attempts == 1 => Ok(()),
            other => Err(format!("Unexpected result {:?}", other)),
        }
    })
}

#[test]
fn execute_without_response_reports_no_response() -> Result<(), String> {
    run_async_test(async {
        match engine(None).execute(&spec(2)?).await {
            Err(AppError::RequestFailed {
                attempts: 2,
                reason,
            }) if reason.starts_with("no response obtained") => Ok(()),
            other => Err(format!("Unexpected result {:?}", other)),
        }
    })
}

#[test]
fn execute_with_failed_assertion_reports_verification() -> Result<(), String> {
    run_async_test(async {
        let mut request = spec(1)?;
        request.assertions = Some(Assertions {
            status: 200,
            ..Assertions::default()
        });
        match engine(Some(404)).execute(&request).await {
            Err(AppError::RequestFailed {
                attempts: 1,
                reason,
            }) if reason.contains("failed verification")
                && reason.contains("expected status 200, got 404") =>
            {
                Ok(())
            }
            other => Err(format!("Unexpected result {:?}", other)),
        }
    })
}

#[test]
fn execute_benchmark_summarizes_every_unit() -> Result<(), String> {
    run_async_test(async {
        let mut request = spec(1)?;
        request.set_concurrency(
            PositiveUsize::try_from(6).map_err(|err| err.to_string())?,
            PositiveUsize::try_from(3).map_err(|err| err.to_string())?,
        );
        request.assertions = Some(Assertions {
            status: 201,
            ..Assertions::default()
        });
        match engine(Some(200)).execute(&request).await {
            Ok(ExecutionReport::Benchmark { result, workers: 3, .. })
                if result.total == 6 && result.failures == 6 && result.avg().is_none() =>
            {
                Ok(())
            }
            other => Err(format!("Unexpected result {:?}", other)),
        }
    })
}

#[test]
fn engine_send_and_verify_are_single_attempts() -> Result<(), String> {
    run_async_test(async {
        let engine = engine(Some(503));
        let request = spec(5)?;
        let response = engine.send(&request).await.map_err(|err| err.to_string())?;
        if response.status != 503 {
            return Err(format!("Unexpected status {}", response.status));
        }
        let attempt = engine.send_and_verify(&request).await;
        if !attempt.ok() {
            return Err(format!("Unasserted 503 should pass: {:?}", attempt));
        }
        Ok(())
    })
}
