//! Lead Form Engine - dynamic lead-capture forms built from admin-authored data
//!
//! Provides:
//! - Field library and field assignment models
//! - Assignment resolution (orphan and malformed entry filtering, ordering)
//! - Localization of labels, placeholders, descriptions and options
//! - Validation schema synthesis and default values
//! - Form sessions (loading, retry and offline policy, submission)
//! - Submission payload assembly
//! - Backend abstraction for field fetching and lead storage

pub mod blueprint;
pub mod catalog;
pub mod config;
pub mod defaults;
pub mod localization;
pub mod models;
pub mod resolve;
pub mod schema;
pub mod session;
pub mod storage;
pub mod submission;

// Re-export commonly used types
pub use storage::{BackendError, FormBackend, InMemoryFormBackend};

pub use blueprint::{BlueprintCache, BlueprintField, FormBlueprint};
pub use catalog::{CatalogError, FormCatalog, TemplateDefinition};
pub use config::{ConfigError, EngineProfile, EngineProfileBuilder};
pub use defaults::{default_value, default_values};
pub use localization::{LocalizedText, localize};
pub use resolve::{DropReason, DroppedAssignment, Resolution, ResolvedField, resolve_assignments};
pub use schema::{FieldRule, FormSchema, ValidationMessage, ValidationReport};
pub use submission::{FormTarget, LeadAck, LeadPayload, assemble_payload};

// Re-export models
pub use models::{
    FieldAssignment, FieldDataType, FieldLibraryEntry, FieldTranslation, FieldValue, FormValues,
    ValidationOptions,
};

// Re-export session types
pub use session::{
    CloseHandle, Connectivity, FieldDescriptor, FormNotice, FormSession, RetryAction,
    SessionError, SessionResult, SessionStatus, SubmitBlocked, SubmitOutcome,
};
