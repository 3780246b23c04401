use std::time::Duration;

use serde::Deserialize;

use crate::args::{HttpMethod, parse_duration_value};
use crate::error::ConfigError;

/// Defaults applied to flags that were not given on the command line.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub method: Option<HttpMethod>,
    /// `Key: Value` entries, same format as `--header`.
    pub headers: Option<Vec<String>>,
    pub user_agent: Option<String>,
    #[serde(alias = "retry")]
    pub retries: Option<u32>,
    pub backoff: Option<DurationValue>,
    pub repeat: Option<usize>,
    pub workers: Option<usize>,
    pub timeout: Option<DurationValue>,
    pub connect_timeout: Option<DurationValue>,
    pub expect_status: Option<u16>,
    pub env_file: Option<String>,
    pub history_path: Option<String>,
    pub verbose: Option<bool>,
}

/// A duration given either as whole seconds or as text such as `"250ms"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self, field: &'static str) -> Result<Duration, ConfigError> {
        match self {
            DurationValue::Seconds(secs) => Ok(Duration::from_secs(*secs)),
            DurationValue::Text(text) => parse_duration_value(text)
                .map_err(|source| ConfigError::InvalidDuration { field, source }),
        }
    }

    /// Like [`DurationValue::to_duration`], rejecting zero.
    pub(crate) fn to_positive_duration(
        &self,
        field: &'static str,
    ) -> Result<Duration, ConfigError> {
        let duration = self.to_duration(field)?;
        if duration.is_zero() {
            return Err(ConfigError::NotPositive { field });
        }
        Ok(duration)
    }
}
