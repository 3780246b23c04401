use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{PokeArgs, PositiveUsize, parse_header};
use crate::error::ConfigError;

use super::types::ConfigFile;

/// Applies configuration values to CLI arguments that were not set on the command line.
///
/// # Errors
///
/// Returns an error when a config value is invalid.
pub fn apply_config(
    args: &mut PokeArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> Result<(), ConfigError> {
    if !is_cli(matches, "method")
        && let Some(method) = config.method
    {
        args.method = method;
    }

    if !is_cli(matches, "headers")
        && let Some(headers) = config.headers.as_ref()
    {
        let mut parsed = Vec::with_capacity(headers.len());
        for header in headers {
            parsed.push(
                parse_header(header).map_err(|source| ConfigError::InvalidHeader { source })?,
            );
        }
        args.headers = parsed;
    }

    if !is_cli(matches, "user_agent")
        && let Some(user_agent) = config.user_agent.clone()
    {
        args.user_agent = user_agent;
    }

    if !is_cli(matches, "retries")
        && let Some(retries) = config.retries
    {
        args.retries = retries;
    }

    if !is_cli(matches, "backoff")
        && let Some(backoff) = config.backoff.as_ref()
    {
        args.backoff = backoff.to_duration("backoff")?;
    }

    if !is_cli(matches, "repeat")
        && let Some(repeat) = config.repeat
    {
        args.repeat = ensure_positive_usize(repeat, "repeat")?;
    }

    if !is_cli(matches, "workers")
        && let Some(workers) = config.workers
    {
        args.workers = ensure_positive_usize(workers, "workers")?;
    }

    if !is_cli(matches, "request_timeout")
        && let Some(timeout) = config.timeout.as_ref()
    {
        args.request_timeout = timeout.to_positive_duration("timeout")?;
    }

    if !is_cli(matches, "connect_timeout")
        && let Some(timeout) = config.connect_timeout.as_ref()
    {
        args.connect_timeout = timeout.to_positive_duration("connect_timeout")?;
    }

    if !is_cli(matches, "expect_status")
        && let Some(status) = config.expect_status
    {
        args.expect_status = status;
    }

    if !is_cli(matches, "env_file")
        && let Some(env_file) = config.env_file.clone()
    {
        args.env_file = env_file;
    }

    if !is_cli(matches, "history_path")
        && let Some(history_path) = config.history_path.clone()
    {
        args.history_path = history_path;
    }

    if !is_cli(matches, "verbose")
        && let Some(verbose) = config.verbose
    {
        args.verbose = verbose;
    }

    Ok(())
}

/// Whether `name` was given explicitly on the command line.
pub(crate) fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}

fn ensure_positive_usize(value: usize, field: &'static str) -> Result<PositiveUsize, ConfigError> {
    PositiveUsize::try_from(value).map_err(|_err| ConfigError::NotPositive { field })
}
