use std::time::Instant;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::debug;

use crate::domain::{Multimap, RequestSpec, Response};
use crate::error::HttpError;

/// One network round trip. Implementations must be shareable between workers.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &RequestSpec) -> Result<Response, HttpError>;
}

/// Production transport backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &RequestSpec) -> Result<Response, HttpError> {
        let request_headers = build_header_map(&request.headers)?;
        let mut builder = self
            .client
            .request(request.method.to_reqwest(), request.url.clone())
            .headers(request_headers);
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }
        let prepared = builder
            .build()
            .map_err(|source| HttpError::BuildRequestFailed { source })?;

        let start = Instant::now();
        let response = self
            .client
            .execute(prepared)
            .await
            .map_err(HttpError::from_send)?;
        let status = response.status().as_u16();
        let headers = collect_headers(response.headers());
        let body = read_body(response).await?;
        let duration = start.elapsed();
        debug!(
            "{} {} -> {} ({} bytes, {:?})",
            request.method,
            request.url,
            status,
            body.len(),
            duration
        );

        Ok(Response::new(status, headers, body, duration))
    }
}

/// Converts a header multimap into a `HeaderMap`, appending every value.
///
/// # Errors
///
/// Returns an error when a header name or value is not valid HTTP.
pub fn build_header_map(headers: &Multimap) -> Result<HeaderMap, HttpError> {
    let mut map = HeaderMap::new();
    for (key, values) in headers {
        let name = HeaderName::from_bytes(key.as_bytes()).map_err(|source| {
            HttpError::InvalidHeaderName {
                name: key.clone(),
                source,
            }
        })?;
        for value in values {
            let parsed =
                HeaderValue::from_str(value).map_err(|source| HttpError::InvalidHeaderValue {
                    name: key.clone(),
                    source,
                })?;
            map.append(name.clone(), parsed);
        }
    }
    Ok(map)
}

/// `x-request-id` -> `X-Request-Id`.
#[must_use]
pub fn canonical_header_name(name: &str) -> String {
    let mut canonical = String::with_capacity(name.len());
    let mut upper_next = true;
    for ch in name.chars() {
        if upper_next {
            canonical.push(ch.to_ascii_uppercase());
        } else {
            canonical.push(ch.to_ascii_lowercase());
        }
        upper_next = ch == '-';
    }
    canonical
}

fn collect_headers(headers: &HeaderMap) -> Multimap {
    let mut collected = Multimap::new();
    for (name, value) in headers {
        collected
            .entry(canonical_header_name(name.as_str()))
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    collected
}

async fn read_body(response: reqwest::Response) -> Result<Vec<u8>, HttpError> {
    let mut stream = response.bytes_stream();
    let mut body = Vec::new();
    while let Some(chunk) = stream.next().await {
        let bytes = chunk.map_err(|source| HttpError::ReadBody { source })?;
        body.extend_from_slice(&bytes);
    }
    Ok(body)
}
