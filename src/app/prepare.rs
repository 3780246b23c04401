use std::path::Path;

use crate::args::PokeArgs;
use crate::domain::{Assertions, RequestTemplate};
use crate::error::{AppError, AppResult, ValidationError};
use crate::payload::PayloadSources;

const CONTENT_TYPE: &str = "Content-Type";
const JSON: &str = "application/json";
const TEXT: &str = "text/plain; charset=utf-8";

/// Builds the unrendered request from command-line flags.
///
/// # Errors
///
/// Returns an error when no URL was given.
pub fn template_from_args(args: &PokeArgs) -> AppResult<RequestTemplate> {
    let url = args
        .url
        .clone()
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| AppError::validation(ValidationError::MissingUrl))?;

    let mut template = RequestTemplate {
        method: args.method,
        url,
        body: args.data.clone(),
        body_file: args.data_file.clone().unwrap_or_default(),
        body_stdin: args.data_stdin,
        retries: args.retries,
        backoff_ms: u64::try_from(args.backoff.as_millis()).unwrap_or(u64::MAX),
        repeat: args.repeat.get(),
        workers: args.workers.get(),
        ..RequestTemplate::default()
    };
    for (key, value) in &args.headers {
        template.push_header(key, value);
    }

    let mut assertions = Assertions {
        status: args.expect_status,
        body_contains: args.expect_body.clone().unwrap_or_default(),
        ..Assertions::default()
    };
    for (key, value) in &args.expect_headers {
        assertions
            .headers
            .entry(key.clone())
            .or_default()
            .push(value.clone());
    }
    if !assertions.is_empty() {
        template.assertions = Some(assertions);
    }
    Ok(template)
}

/// Payload sources described by a rendered template.
#[must_use]
pub fn payload_sources(template: &RequestTemplate, edit: bool) -> PayloadSources {
    PayloadSources {
        data: template.body.clone(),
        data_file: template.body_file.clone(),
        stdin: template.body_stdin,
        edit,
    }
}

/// Guesses a content type from the body file extension, then from the bytes.
#[must_use]
pub fn infer_content_type(body: &[u8], body_file: &str) -> Option<&'static str> {
    if body.is_empty() {
        return None;
    }
    let extension = Path::new(body_file)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    if let Some(by_extension) = extension.as_deref().and_then(content_type_for_extension) {
        return Some(by_extension);
    }
    if serde_json::from_slice::<serde_json::Value>(body).is_ok() {
        return Some(JSON);
    }
    if looks_like_html(body) {
        return Some("text/html; charset=utf-8");
    }
    if std::str::from_utf8(body).is_ok() {
        return Some(TEXT);
    }
    Some("application/octet-stream")
}

/// Adds a `Content-Type` header when the body is non-empty and none was set.
pub fn apply_default_content_type(template: &mut RequestTemplate, body: &[u8]) {
    if template.has_header(CONTENT_TYPE) {
        return;
    }
    if let Some(content_type) = infer_content_type(body, &template.body_file) {
        template.push_header(CONTENT_TYPE, content_type);
    }
}

fn content_type_for_extension(extension: &str) -> Option<&'static str> {
    match extension {
        "json" => Some(JSON),
        "xml" => Some("application/xml"),
        "html" | "htm" => Some("text/html; charset=utf-8"),
        "txt" => Some(TEXT),
        "csv" => Some("text/csv"),
        "yaml" | "yml" => Some("application/yaml"),
        _ => None,
    }
}

fn looks_like_html(body: &[u8]) -> bool {
    let trimmed = body.trim_ascii_start();
    let Some(head) = trimmed.get(..trimmed.len().min(15)) else {
        return false;
    };
    let head = head.to_ascii_lowercase();
    head.starts_with(b"<!doctype html") || head.starts_with(b"<html")
}
