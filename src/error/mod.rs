mod app;
mod config;
mod history;
mod http;
mod payload;
mod validation;
mod verify;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use history::HistoryError;
pub use http::HttpError;
pub use payload::PayloadError;
pub use validation::ValidationError;
pub use verify::{AttemptError, VerificationError};
