use thiserror::Error;

use super::HttpError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("expected status {expected}, got {actual}")]
    StatusMismatch { expected: u16, actual: u16 },
    #[error("expected body to contain {fragment:?}")]
    BodyMissing { fragment: String },
    #[error("expected header {key:?}, but it is missing")]
    HeaderMissing { key: String },
    #[error("expected header {key:?} to have values, but it is empty")]
    HeaderEmpty { key: String },
    #[error("expected header {key:?} to contain {value:?}, but it was not found")]
    HeaderValueMissing { key: String, value: String },
}

/// Reason a single attempt did not count as a success.
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("{0}")]
    Transport(#[from] HttpError),
    #[error("{0}")]
    Verification(#[from] VerificationError),
}

impl AttemptError {
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, AttemptError::Transport(_))
    }
}
