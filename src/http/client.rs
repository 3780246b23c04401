use std::time::Duration;

use reqwest::Client;

use crate::args::DEFAULT_USER_AGENT;
use crate::error::HttpError;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Knobs for the shared HTTP client. One client is built per execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

/// Builds the reqwest client used by every attempt of an execution.
///
/// # Errors
///
/// Returns an error when the TLS backend or resolver cannot be initialized.
pub fn build_client(settings: &ClientSettings) -> Result<Client, HttpError> {
    let mut builder = Client::builder()
        .timeout(settings.request_timeout)
        .connect_timeout(settings.connect_timeout);
    if !settings.user_agent.is_empty() {
        builder = builder.user_agent(settings.user_agent.as_str());
    }
    builder
        .build()
        .map_err(|source| HttpError::BuildClientFailed { source })
}
