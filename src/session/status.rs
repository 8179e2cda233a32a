//! Session status, notices and submit availability

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a form session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Idle,
    Loading,
    Ready,
    Submitting,
    Succeeded,
    Failed,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Loading => "loading",
            SessionStatus::Ready => "ready",
            SessionStatus::Submitting => "submitting",
            SessionStatus::Succeeded => "succeeded",
            SessionStatus::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Why the submit action is currently disabled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitBlocked {
    /// The session has been closed
    Closed,
    /// A submission is in flight
    Submitting,
    /// The form was never opened
    NotLoaded,
    /// Fields are still being fetched
    Loading,
    /// Fetching the fields failed; reload first
    LoadFailed,
    /// The device is offline
    Offline,
    /// The template has no valid fields
    NoFields,
}

impl SubmitBlocked {
    /// Explanation shown next to the disabled submit control
    pub fn explanation(&self) -> &'static str {
        match self {
            SubmitBlocked::Closed => "This form has been closed.",
            SubmitBlocked::Submitting => "Sending your details…",
            SubmitBlocked::NotLoaded => "The form has not been opened yet.",
            SubmitBlocked::Loading => "Loading the form…",
            SubmitBlocked::LoadFailed => "The form could not be loaded. Reload to try again.",
            SubmitBlocked::Offline => "You are offline. Submitting resumes when you reconnect.",
            SubmitBlocked::NoFields => "This form has no fields to fill in.",
        }
    }
}

impl fmt::Display for SubmitBlocked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.explanation())
    }
}

/// Action offered with a transport error banner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryAction {
    /// Refetch the form fields
    Reload,
    /// Submit the same values again
    Resubmit,
}

/// Form-level notice for the rendering layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FormNotice {
    /// Persistent while the connectivity signal reports offline
    Offline,
    /// Failed fetch or submission
    TransportError { message: String, retry: RetryAction },
}

impl FormNotice {
    pub fn message(&self) -> String {
        match self {
            FormNotice::Offline => {
                "You are offline. Your answers are kept and can be sent once you reconnect."
                    .to_string()
            }
            FormNotice::TransportError { message, .. } => message.clone(),
        }
    }

    pub fn is_dismissible(&self) -> bool {
        !matches!(self, FormNotice::Offline)
    }
}
