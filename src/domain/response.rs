use std::borrow::Cow;
use std::time::Duration;

use chrono::{DateTime, Utc};

use super::Multimap;

/// One received response. Created once per attempt and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    /// Header names as delivered by the transport adapter (canonical `Title-Case`).
    pub headers: Multimap,
    pub body: Vec<u8>,
    pub content_type: String,
    pub timestamp: DateTime<Utc>,
    /// Network round trip of the attempt that produced this response.
    pub duration: Duration,
}

impl Response {
    #[must_use]
    pub fn new(status: u16, headers: Multimap, body: Vec<u8>, duration: Duration) -> Self {
        let content_type = headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case("content-type"))
            .and_then(|(_, values)| values.first())
            .cloned()
            .unwrap_or_default();
        Self {
            status,
            headers,
            body,
            content_type,
            timestamp: Utc::now(),
            duration,
        }
    }

    #[must_use]
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    #[must_use]
    pub fn is_json(&self) -> bool {
        self.content_type.contains("application/json")
    }
}
