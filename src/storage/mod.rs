//! Form backend abstraction
//!
//! Defines the FormBackend trait the engine uses to reach its external
//! collaborators:
//! - field assignment fetching (read-only, idempotent, safe to retry)
//! - lead submission (not idempotent, never retried by the engine)
//!
//! Implementations:
//! - InMemoryFormBackend: in-process store keyed by id (tests, embedding, demos)

use crate::models::FieldAssignment;
use crate::submission::{LeadAck, LeadPayload};
use async_trait::async_trait;

pub mod memory;

pub use memory::InMemoryFormBackend;

/// Error type for backend operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Rejected: {0}")]
    Rejected(String),
    #[error("Backend error: {0}")]
    BackendError(String),
}

impl BackendError {
    /// Check if a fetch failing with this error may be retried
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BackendError::NetworkError(_) | BackendError::BackendError(_)
        )
    }

    /// Message suitable for a form-level banner
    pub fn user_message(&self) -> String {
        match self {
            BackendError::NotFound(_) => "This form is no longer available.".to_string(),
            BackendError::NetworkError(_) => {
                "We could not reach the server. Please try again.".to_string()
            }
            BackendError::Rejected(reason) => format!("Your submission was rejected: {reason}"),
            BackendError::SerializationError(_) | BackendError::BackendError(_) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}

/// Trait for form backends
///
/// Persistence of field libraries, templates and leads lives behind this
/// trait; the engine only reads assignments and writes leads.
#[async_trait(?Send)]
pub trait FormBackend: Send + Sync {
    /// Fetch the assignments of a form template, each joined with its field
    /// library entry (`field_library` is `None` for orphaned assignments)
    async fn fetch_field_assignments(
        &self,
        form_template_id: &str,
    ) -> Result<Vec<FieldAssignment>, BackendError>;

    /// Store a lead; at most one call per user action
    async fn submit_lead(&self, payload: &LeadPayload) -> Result<LeadAck, BackendError>;
}
