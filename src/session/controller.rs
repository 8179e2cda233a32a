//! Form session controller
//!
//! Drives one open form through its lifecycle:
//!
//! ```text
//! Idle -> Loading -> Ready -> Submitting -> Succeeded
//!            |         ^          |
//!            v         |          v
//!          Failed      +------ Failed (submission rejected, back to Ready)
//! ```
//!
//! All transitions happen through `&mut self`, so a session never runs two
//! actions at once. Loading may retry per [`EngineProfile`]; the retry timer
//! and the fetch are abandoned as soon as the session is closed.

use super::connectivity::Connectivity;
use super::descriptor::FieldDescriptor;
use super::error::{SessionError, SessionResult};
use super::list_editor::ListEditor;
use super::status::{FormNotice, RetryAction, SessionStatus, SubmitBlocked};
use crate::blueprint::{BlueprintCache, FormBlueprint};
use crate::config::EngineProfile;
use crate::models::{FieldAssignment, FieldValue, FormValues};
use crate::schema::ValidationReport;
use crate::storage::{BackendError, FormBackend};
use crate::submission::{FormTarget, LeadAck, assemble_payload};
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Result of a submit request
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Submit is disabled; nothing happened
    Blocked(SubmitBlocked),
    /// Validation failed; errors are set on the session
    Invalid(ValidationReport),
    /// The lead store accepted the lead; values are back to defaults
    Accepted(LeadAck),
}

/// Cloneable handle closing a session from outside its owner
#[derive(Debug, Clone)]
pub struct CloseHandle {
    signal: Arc<watch::Sender<bool>>,
}

impl CloseHandle {
    fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            signal: Arc::new(sender),
        }
    }

    pub fn close(&self) {
        self.signal.send_replace(true);
    }

    pub fn is_closed(&self) -> bool {
        *self.signal.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.signal.subscribe()
    }
}

/// Runtime instance of one open form
pub struct FormSession<B: FormBackend> {
    backend: Arc<B>,
    target: FormTarget,
    language: String,
    profile: EngineProfile,
    status: SessionStatus,
    cache: BlueprintCache,
    blueprint: Option<Arc<FormBlueprint>>,
    values: FormValues,
    errors: BTreeMap<String, String>,
    transport_error: Option<FormNotice>,
    connectivity: watch::Receiver<bool>,
    last_online: bool,
    close: CloseHandle,
}

impl<B: FormBackend> FormSession<B> {
    /// Create an idle session for `target`; call [`open`](Self::open) to load it
    pub fn new(
        backend: Arc<B>,
        target: FormTarget,
        profile: EngineProfile,
        connectivity: &Connectivity,
    ) -> Self {
        let mut connectivity = connectivity.subscribe();
        let last_online = *connectivity.borrow_and_update();
        Self {
            backend,
            target,
            language: profile.default_language.clone(),
            profile,
            status: SessionStatus::Idle,
            cache: BlueprintCache::new(),
            blueprint: None,
            values: FormValues::new(),
            errors: BTreeMap::new(),
            transport_error: None,
            connectivity,
            last_online,
            close: CloseHandle::new(),
        }
    }

    /// Select the form language; only possible before opening
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        let language = language.into();
        if !language.trim().is_empty() {
            self.language = language;
        }
        self
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn target(&self) -> &FormTarget {
        &self.target
    }

    pub fn profile(&self) -> &EngineProfile {
        &self.profile
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn value(&self, field_name: &str) -> Option<&FieldValue> {
        self.values.get(field_name)
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn blueprint(&self) -> Option<&Arc<FormBlueprint>> {
        self.blueprint.as_ref()
    }

    pub fn close_handle(&self) -> CloseHandle {
        self.close.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.close.is_closed()
    }

    /// Close the session; pending retries stop and later actions fail
    pub fn close(&mut self) {
        debug!("Closing form session for {}", self.target.form_template_id);
        self.close.close();
    }

    /// Open the form: fetch assignments and synthesize schema and defaults
    pub async fn open(&mut self) -> SessionResult<()> {
        self.load().await
    }

    /// Refetch the form from any state; in-progress edits are discarded
    pub async fn refresh(&mut self) -> SessionResult<()> {
        self.load().await
    }

    /// Set the value of a field
    pub fn set_value(
        &mut self,
        field_name: &str,
        value: impl Into<FieldValue>,
    ) -> SessionResult<()> {
        self.ensure_open()?;
        match self.status {
            SessionStatus::Ready => {}
            SessionStatus::Succeeded => self.transition(SessionStatus::Ready),
            status => return Err(SessionError::NotReady(status)),
        }
        let blueprint = self
            .blueprint
            .clone()
            .ok_or(SessionError::NotReady(self.status))?;
        let rule = blueprint
            .schema
            .rule(field_name)
            .ok_or_else(|| SessionError::UnknownField(field_name.to_string()))?;

        let mut value = value.into();
        if let (FieldValue::List(rows), Some(max)) = (&mut value, rule.max_items()) {
            if rows.len() > max {
                warn!(
                    "Truncating {} rows of {} to the limit of {}",
                    rows.len(),
                    field_name,
                    max
                );
                rows.truncate(max);
            }
        }

        // Fields already showing an error are re-checked on every edit
        if self.errors.contains_key(field_name) {
            match blueprint.schema.validate_field(field_name, Some(&value)) {
                Some(message) => self.errors.insert(field_name.to_string(), message),
                None => self.errors.remove(field_name),
            };
        }
        self.values.insert(field_name.to_string(), value);
        Ok(())
    }

    /// Row editor of a list field, writing through to the session values
    pub fn list_editor(&mut self, field_name: &str) -> SessionResult<ListEditor<'_, B>> {
        let blueprint = self
            .blueprint
            .as_ref()
            .ok_or(SessionError::NotReady(self.status))?;
        let field = blueprint
            .field(field_name)
            .ok_or_else(|| SessionError::UnknownField(field_name.to_string()))?;
        if !field.field.data_type().is_list() {
            return Err(SessionError::NotAList(field_name.to_string()));
        }
        let max_items = field.field.validation.max_items;
        Ok(ListEditor::new(self, field_name, max_items))
    }

    /// Validate all fields and publish the errors
    pub fn validate(&mut self) -> ValidationReport {
        let report = match &self.blueprint {
            Some(blueprint) => blueprint.schema.validate(&self.values),
            None => ValidationReport {
                valid: true,
                errors: BTreeMap::new(),
            },
        };
        self.errors = report.errors.clone();
        report
    }

    /// Why submit is disabled, or `Ok` when it is enabled
    pub fn submit_availability(&self) -> Result<(), SubmitBlocked> {
        if self.is_closed() {
            return Err(SubmitBlocked::Closed);
        }
        match self.status {
            SessionStatus::Submitting => return Err(SubmitBlocked::Submitting),
            SessionStatus::Idle => return Err(SubmitBlocked::NotLoaded),
            SessionStatus::Loading => return Err(SubmitBlocked::Loading),
            SessionStatus::Failed => return Err(SubmitBlocked::LoadFailed),
            SessionStatus::Ready | SessionStatus::Succeeded => {}
        }
        if self.is_offline() {
            return Err(SubmitBlocked::Offline);
        }
        match &self.blueprint {
            Some(blueprint) if !blueprint.is_empty() => Ok(()),
            _ => Err(SubmitBlocked::NoFields),
        }
    }

    /// Validate and submit the current values
    ///
    /// A disabled submit is a no-op reported as [`SubmitOutcome::Blocked`].
    /// A rejected submission returns the session to `Ready` with a transport
    /// notice; it is never retried automatically.
    pub async fn submit(&mut self) -> SessionResult<SubmitOutcome> {
        self.sync_connectivity();
        if let Err(reason) = self.submit_availability() {
            debug!("Submit ignored: {}", reason);
            return Ok(SubmitOutcome::Blocked(reason));
        }

        let report = self.validate();
        if !report.is_valid() {
            debug!("Submit stopped by {} invalid field(s)", report.errors.len());
            return Ok(SubmitOutcome::Invalid(report));
        }

        self.transition(SessionStatus::Submitting);
        self.transport_error = None;
        let payload = assemble_payload(&self.target, &self.values, &self.language, Utc::now());
        let backend = Arc::clone(&self.backend);
        let result = backend.submit_lead(&payload).await;

        if self.is_closed() {
            debug!("Session closed during submission; result not applied");
            return result.map(SubmitOutcome::Accepted).map_err(SessionError::Submission);
        }

        match result {
            Ok(ack) => {
                info!(
                    "Lead {} submitted for form template {}",
                    ack.lead_id, self.target.form_template_id
                );
                self.reset_to_defaults();
                self.transition(SessionStatus::Succeeded);
                Ok(SubmitOutcome::Accepted(ack))
            }
            Err(e) => {
                warn!(
                    "Submission for form template {} failed: {}",
                    self.target.form_template_id, e
                );
                self.transport_error = Some(FormNotice::TransportError {
                    message: e.user_message(),
                    retry: RetryAction::Resubmit,
                });
                self.transition(SessionStatus::Failed);
                self.transition(SessionStatus::Ready);
                Err(SessionError::Submission(e))
            }
        }
    }

    /// Descriptors of every valid field in render order
    pub fn descriptors(&self) -> Vec<FieldDescriptor> {
        let Some(blueprint) = &self.blueprint else {
            return Vec::new();
        };
        blueprint
            .fields
            .iter()
            .map(|field| {
                let name = field.field.name();
                let validation = &field.field.validation;
                FieldDescriptor {
                    field_name: name.to_string(),
                    data_type: field.field.data_type().clone(),
                    resolved_label: field.text.label.clone(),
                    resolved_placeholder: field.text.placeholder.clone(),
                    resolved_description: field.text.description.clone(),
                    resolved_options: field.text.options.clone(),
                    is_required: field.field.is_required(),
                    current_value: self
                        .values
                        .get(name)
                        .cloned()
                        .unwrap_or_else(|| FieldValue::Text(String::new())),
                    current_error: self.errors.get(name).cloned(),
                    order: field.field.assignment.sort_key(),
                    section: field.field.assignment.section.clone(),
                    item_label: validation.item_label.clone(),
                    item_placeholder: validation.item_placeholder.clone(),
                    max_items: validation.max_items,
                }
            })
            .collect()
    }

    /// Form-level notices: offline first, then any transport error
    pub fn notices(&self) -> Vec<FormNotice> {
        let mut notices = Vec::new();
        if self.is_offline() {
            notices.push(FormNotice::Offline);
        }
        if let Some(error) = &self.transport_error {
            notices.push(error.clone());
        }
        notices
    }

    /// Dismiss the transport error banner
    pub fn dismiss_error(&mut self) {
        self.transport_error = None;
    }

    pub fn is_offline(&self) -> bool {
        !*self.connectivity.borrow()
    }

    /// Apply the latest connectivity value; returns whether the session is online
    pub fn sync_connectivity(&mut self) -> bool {
        let online = *self.connectivity.borrow_and_update();
        if online != self.last_online {
            if online {
                info!("Back online; submitting enabled again");
            } else {
                info!("Offline; submitting disabled");
            }
            self.last_online = online;
        }
        online
    }

    /// Wait for the next connectivity change and apply it
    pub async fn connectivity_changed(&mut self) -> bool {
        if self.connectivity.changed().await.is_err() {
            // Signal dropped: keep the last known state
            return self.last_online;
        }
        self.sync_connectivity()
    }

    async fn load(&mut self) -> SessionResult<()> {
        self.ensure_open()?;
        self.transition(SessionStatus::Loading);
        self.transport_error = None;

        let retries = self.profile.load_retries();
        let delay = self.profile.retry_delay();
        let mut attempts = 0;

        loop {
            attempts += 1;
            match self.fetch_or_close().await? {
                Ok(assignments) => {
                    self.apply_fetch(assignments);
                    return Ok(());
                }
                Err(e) if attempts <= retries && e.is_retryable() => {
                    warn!(
                        "Fetching form template {} failed (attempt {}/{}): {}; retrying in {:?}",
                        self.target.form_template_id,
                        attempts,
                        retries + 1,
                        e,
                        delay
                    );
                    self.sleep_or_close(delay).await?;
                }
                Err(e) => {
                    warn!(
                        "Fetching form template {} failed after {} attempt(s): {}",
                        self.target.form_template_id, attempts, e
                    );
                    self.transport_error = Some(FormNotice::TransportError {
                        message: e.user_message(),
                        retry: RetryAction::Reload,
                    });
                    // Fields of an earlier load are stale once a refresh fails
                    self.blueprint = None;
                    self.values.clear();
                    self.errors.clear();
                    self.transition(SessionStatus::Failed);
                    return Err(SessionError::Load {
                        attempts,
                        source: e,
                    });
                }
            }
        }
    }

    fn apply_fetch(&mut self, assignments: Vec<FieldAssignment>) {
        let source = self.cache.intern(assignments);
        let blueprint = self.cache.get_or_build(&source, &self.language, &self.profile);
        info!(
            "Loaded form template {}: {} field(s), {} dropped",
            self.target.form_template_id,
            blueprint.fields.len(),
            blueprint.dropped.len()
        );
        self.values = blueprint.defaults.clone();
        self.errors.clear();
        self.blueprint = Some(blueprint);
        self.transition(SessionStatus::Ready);
    }

    fn reset_to_defaults(&mut self) {
        if let Some(blueprint) = &self.blueprint {
            self.values = blueprint.defaults.clone();
        }
        self.errors.clear();
    }

    async fn fetch_or_close(
        &self,
    ) -> SessionResult<Result<Vec<FieldAssignment>, BackendError>> {
        let mut closed = self.close.subscribe();
        let backend = Arc::clone(&self.backend);
        let template_id = self.target.form_template_id.clone();
        tokio::select! {
            result = backend.fetch_field_assignments(&template_id) => Ok(result),
            _ = closed.wait_for(|closed| *closed) => Err(SessionError::Closed),
        }
    }

    async fn sleep_or_close(&self, delay: Duration) -> SessionResult<()> {
        let mut closed = self.close.subscribe();
        tokio::select! {
            _ = tokio::time::sleep(delay) => Ok(()),
            _ = closed.wait_for(|closed| *closed) => Err(SessionError::Closed),
        }
    }

    fn ensure_open(&self) -> SessionResult<()> {
        if self.is_closed() {
            Err(SessionError::Closed)
        } else {
            Ok(())
        }
    }

    fn transition(&mut self, next: SessionStatus) {
        debug!(
            "Form template {}: {} -> {}",
            self.target.form_template_id, self.status, next
        );
        self.status = next;
    }
}
