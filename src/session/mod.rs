//! Form sessions
//!
//! A [`FormSession`] is the runtime instance of one open form. It owns the
//! current values and errors, drives loading, validation and submission, and
//! observes a [`Connectivity`] signal to block submission while offline.

pub mod connectivity;
pub mod controller;
pub mod descriptor;
pub mod error;
pub mod list_editor;
pub mod status;

pub use connectivity::Connectivity;
pub use controller::{CloseHandle, FormSession, SubmitOutcome};
pub use descriptor::{FieldDescriptor, SectionGroup, group_by_section};
pub use error::{SessionError, SessionResult};
pub use list_editor::ListEditor;
pub use status::{FormNotice, RetryAction, SessionStatus, SubmitBlocked};
