use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::args::{HttpMethod, PositiveUsize};
use crate::error::HttpError;

/// Header or query multimap: unique keys, ordered values per key.
pub type Multimap = BTreeMap<String, Vec<String>>;

pub const DEFAULT_BACKOFF_MS: u64 = 1_000;

const DEFAULT_SCHEME: &str = "http";

/// Declarative checks applied to every received response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Assertions {
    /// Expected status code; 0 leaves the status unchecked.
    pub status: u16,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub body_contains: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: Multimap,
}

impl Assertions {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.status == 0 && self.body_contains.is_empty() && self.headers.is_empty()
    }
}

/// Unresolved request as built from flags or loaded from a request file.
///
/// Text fields may still contain `{{env.*}}` / `{{history.*}}` placeholders,
/// and the body may still live in a file or on stdin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestTemplate {
    pub method: HttpMethod,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub scheme: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub host: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub path: String,
    pub headers: Multimap,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub query_params: Multimap,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub body: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub body_file: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub body_stdin: bool,
    pub retries: u32,
    pub backoff_ms: u64,
    pub repeat: usize,
    pub workers: usize,
    #[serde(rename = "assert", skip_serializing_if = "Option::is_none")]
    pub assertions: Option<Assertions>,
}

impl Default for RequestTemplate {
    fn default() -> Self {
        Self {
            method: HttpMethod::Get,
            url: String::new(),
            scheme: String::new(),
            host: String::new(),
            path: String::new(),
            headers: Multimap::new(),
            query_params: Multimap::new(),
            body: String::new(),
            body_file: String::new(),
            body_stdin: false,
            retries: 1,
            backoff_ms: DEFAULT_BACKOFF_MS,
            repeat: 1,
            workers: 1,
            assertions: None,
        }
    }
}

impl RequestTemplate {
    /// The URL to send to: `url` when set, otherwise `scheme://host/path`.
    /// A URL without a scheme is treated as plain HTTP.
    #[must_use]
    pub fn target_url(&self) -> String {
        if !self.url.is_empty() {
            if self.url.contains("://") {
                return self.url.clone();
            }
            return format!("{}://{}", DEFAULT_SCHEME, self.url);
        }
        let scheme = if self.scheme.is_empty() {
            DEFAULT_SCHEME
        } else {
            self.scheme.as_str()
        };
        let path = self.path.trim_start_matches('/');
        format!("{}://{}/{}", scheme, self.host, path)
    }

    /// Appends a header value, keeping earlier values for the same key.
    pub fn push_header(&mut self, key: &str, value: &str) {
        self.headers
            .entry(key.to_owned())
            .or_default()
            .push(value.to_owned());
    }

    #[must_use]
    pub fn has_header(&self, key: &str) -> bool {
        self.headers
            .keys()
            .any(|existing| existing.eq_ignore_ascii_case(key))
    }
}

/// Fully resolved request, shared read-only between workers.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: Multimap,
    pub body: Vec<u8>,
    pub retries: u32,
    pub backoff: Duration,
    pub repeat: PositiveUsize,
    pub workers: PositiveUsize,
    pub assertions: Option<Assertions>,
}

impl RequestSpec {
    #[must_use]
    pub const fn new(method: HttpMethod, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Multimap::new(),
            body: Vec::new(),
            retries: 1,
            backoff: Duration::from_millis(DEFAULT_BACKOFF_MS),
            repeat: PositiveUsize::ONE,
            workers: PositiveUsize::ONE,
            assertions: None,
        }
    }

    /// Builds the resolved request from a rendered template and its resolved body.
    ///
    /// # Errors
    ///
    /// Returns an error when the target URL cannot be parsed or has no host.
    pub fn from_template(template: &RequestTemplate, body: Vec<u8>) -> Result<Self, HttpError> {
        let raw = template.target_url();
        let mut url = Url::parse(&raw).map_err(|source| HttpError::InvalidUrl {
            url: raw.clone(),
            source,
        })?;
        if url.host_str().is_none_or(str::is_empty) {
            return Err(HttpError::UrlMissingHost { url: raw });
        }
        if !template.query_params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, values) in &template.query_params {
                for value in values {
                    pairs.append_pair(key, value);
                }
            }
        }

        let repeat = PositiveUsize::try_from(template.repeat).unwrap_or(PositiveUsize::ONE);
        let workers = PositiveUsize::try_from(template.workers).unwrap_or(PositiveUsize::ONE);

        let mut spec = Self::new(template.method, url);
        spec.headers = template.headers.clone();
        spec.body = body;
        spec.retries = template.retries;
        spec.backoff = Duration::from_millis(template.backoff_ms);
        spec.assertions = template
            .assertions
            .clone()
            .filter(|assertions| !assertions.is_empty());
        spec.set_concurrency(repeat, workers);
        Ok(spec)
    }

    /// Sets repeat and workers, clamping workers down to the repeat count.
    pub const fn set_concurrency(&mut self, repeat: PositiveUsize, workers: PositiveUsize) {
        self.repeat = repeat;
        self.workers = if workers.get() > repeat.get() {
            repeat
        } else {
            workers
        };
    }

    /// Number of attempts each unit makes; zero or one retries both mean a single attempt.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.retries.max(1)
    }

    #[must_use]
    pub const fn is_benchmark(&self) -> bool {
        self.repeat.get() > 1
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case("content-type"))
            .and_then(|(_, values)| values.first())
            .map(String::as_str)
    }
}
