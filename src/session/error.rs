//! Error types for form sessions

use super::status::SessionStatus;
use crate::storage::BackendError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    /// The session was closed; no further transitions happen
    #[error("Form session is closed")]
    Closed,

    #[error("Form session is not ready (status: {0})")]
    NotReady(SessionStatus),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Field {0} does not hold a list")]
    NotAList(String),

    /// Fetching the fields failed and the retry policy is exhausted
    #[error("Failed to load form after {attempts} attempt(s): {source}")]
    Load {
        attempts: u32,
        #[source]
        source: BackendError,
    },

    /// The lead store rejected the submission
    #[error("Submission failed: {0}")]
    Submission(#[source] BackendError),
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;
