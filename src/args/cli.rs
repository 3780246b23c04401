use clap::{Args, Parser, Subcommand};
use std::time::Duration;

use super::defaults::{DEFAULT_ENV_FILE, DEFAULT_USER_AGENT, default_history_path};
use super::parsers::{
    parse_backoff_arg, parse_duration_arg, parse_header, parse_positive_usize,
};
use super::types::{HttpMethod, PositiveUsize};

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Send the request stored in a JSON request file
    Send(SendArgs),
}

#[derive(Debug, Args, Clone)]
pub struct SendArgs {
    /// Path to a saved request file (.json)
    pub path: String,
}

#[derive(Debug, Parser, Clone)]
#[clap(
    name = "poke",
    version,
    about = "Send HTTP requests from flags or request files, with templating, retries, assertions, and concurrent repeats."
)]
pub struct PokeArgs {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Target URL
    pub url: Option<String>,

    /// HTTP method to use (defaults to POST when a body is given)
    #[arg(long, short = 'X', default_value = "get", ignore_case = true)]
    pub method: HttpMethod,

    /// HTTP headers in 'Key: Value' format (repeatable)
    #[arg(long = "header", short = 'H', value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Request body data
    #[arg(long, short, default_value = "")]
    pub data: String,

    /// Request body from file
    #[arg(long = "data-file", conflicts_with_all = ["data", "data_stdin"])]
    pub data_file: Option<String>,

    /// Read the request body from stdin
    #[arg(long = "data-stdin", conflicts_with = "data")]
    pub data_stdin: bool,

    /// Open the request body in $EDITOR before sending
    #[arg(long = "edit", short = 'e')]
    pub edit: bool,

    /// User-Agent header value
    #[arg(long = "user-agent", short = 'A', default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Number of times to send the request (across all workers)
    #[arg(long, default_value = "1", value_parser = parse_positive_usize)]
    pub repeat: PositiveUsize,

    /// Number of concurrent workers (clamped to --repeat)
    #[arg(long, default_value = "1", value_parser = parse_positive_usize)]
    pub workers: PositiveUsize,

    /// Attempts per request before giving up
    #[arg(long = "retry", default_value = "1")]
    pub retries: u32,

    /// Base backoff between attempts (supports ms/s/m/h; 0 disables)
    #[arg(long = "backoff", default_value = "1s", value_parser = parse_backoff_arg)]
    pub backoff: Duration,

    /// Per-request timeout (supports ms/s/m/h)
    #[arg(
        long = "timeout",
        default_value = "30s",
        value_parser = parse_duration_arg,
        global = true
    )]
    pub request_timeout: Duration,

    /// Timeout for establishing a connection (supports ms/s/m/h)
    #[arg(
        long = "connect-timeout",
        default_value = "10s",
        value_parser = parse_duration_arg,
        global = true
    )]
    pub connect_timeout: Duration,

    /// Expected status code (0 disables the check)
    #[arg(long = "expect-status", default_value = "0")]
    pub expect_status: u16,

    /// Substring the response body must contain
    #[arg(long = "expect-body")]
    pub expect_body: Option<String>,

    /// Header value the response must carry, 'Key: Value' (repeatable)
    #[arg(long = "expect-header", value_parser = parse_header)]
    pub expect_headers: Vec<(String, String)>,

    /// Render the request and print it without sending
    #[arg(long = "dry-run", global = true)]
    pub dry_run: bool,

    /// Save the request to a file before sending
    #[arg(long = "save")]
    pub save: Option<String>,

    /// Path to config file (TOML/JSON). Defaults to ./poke.toml or ./poke.json if present.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Dotenv file consulted for {{env.KEY}} placeholders
    #[arg(long = "env-file", default_value = DEFAULT_ENV_FILE, global = true)]
    pub env_file: String,

    /// Where the last response is stored for {{history.*}} placeholders
    #[arg(long = "history-path", default_value_t = default_history_path(), global = true)]
    pub history_path: String,

    /// Enable verbose output (sets log level to debug unless overridden by POKE_LOG/RUST_LOG)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

impl PokeArgs {
    #[must_use]
    pub const fn has_body_source(&self) -> bool {
        !self.data.is_empty() || self.data_file.is_some() || self.data_stdin
    }
}
