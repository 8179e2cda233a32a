//! In-memory form backend
//!
//! Implements FormBackend over in-process maps keyed by id. Assignments are
//! stored without their library entry and joined on fetch, so deleting an
//! entry orphans the assignments that reference it.

use super::{BackendError, FormBackend};
use crate::catalog::FormCatalog;
use crate::models::{FieldAssignment, FieldLibraryEntry};
use crate::submission::{LeadAck, LeadPayload};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Store {
    entries: HashMap<String, FieldLibraryEntry>,
    templates: HashMap<String, Vec<FieldAssignment>>,
    leads: Vec<(LeadAck, LeadPayload)>,
}

/// In-memory store of field library entries, template assignments and leads
#[derive(Debug, Default)]
pub struct InMemoryFormBackend {
    store: RwLock<Store>,
}

impl InMemoryFormBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend holding every entry and template of `catalog`
    pub fn from_catalog(catalog: FormCatalog) -> Result<Self, BackendError> {
        let backend = Self::new();
        for entry in catalog.fields {
            backend.put_entry(entry)?;
        }
        for template in catalog.templates {
            backend.put_template(&template.id)?;
            for assignment in template.assignments {
                backend.put_assignment(&template.id, assignment)?;
            }
        }
        Ok(backend)
    }

    /// Insert or replace a field library entry
    pub fn put_entry(&self, entry: FieldLibraryEntry) -> Result<(), BackendError> {
        self.write()?.entries.insert(entry.id.clone(), entry);
        Ok(())
    }

    /// Delete a field library entry; assignments referencing it become orphans
    pub fn remove_entry(&self, entry_id: &str) -> Result<Option<FieldLibraryEntry>, BackendError> {
        Ok(self.write()?.entries.remove(entry_id))
    }

    /// Create an empty template if it does not exist yet
    pub fn put_template(&self, template_id: &str) -> Result<(), BackendError> {
        self.write()?
            .templates
            .entry(template_id.to_string())
            .or_default();
        Ok(())
    }

    /// Insert or replace (by assignment id) an assignment of a template
    pub fn put_assignment(
        &self,
        template_id: &str,
        mut assignment: FieldAssignment,
    ) -> Result<(), BackendError> {
        // Entries are joined on read
        assignment.field_library = None;
        let mut store = self.write()?;
        let assignments = store.templates.entry(template_id.to_string()).or_default();
        match assignments.iter_mut().find(|a| a.id == assignment.id) {
            Some(existing) => *existing = assignment,
            None => assignments.push(assignment),
        }
        Ok(())
    }

    pub fn remove_assignment(
        &self,
        template_id: &str,
        assignment_id: &str,
    ) -> Result<bool, BackendError> {
        let mut store = self.write()?;
        let Some(assignments) = store.templates.get_mut(template_id) else {
            return Ok(false);
        };
        let before = assignments.len();
        assignments.retain(|a| a.id != assignment_id);
        Ok(assignments.len() != before)
    }

    /// Submitted leads in submission order
    pub fn leads(&self) -> Result<Vec<LeadPayload>, BackendError> {
        Ok(self
            .read()?
            .leads
            .iter()
            .map(|(_, payload)| payload.clone())
            .collect())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Store>, BackendError> {
        self.store
            .read()
            .map_err(|e| BackendError::BackendError(format!("Store lock poisoned: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Store>, BackendError> {
        self.store
            .write()
            .map_err(|e| BackendError::BackendError(format!("Store lock poisoned: {}", e)))
    }
}

#[async_trait(?Send)]
impl FormBackend for InMemoryFormBackend {
    async fn fetch_field_assignments(
        &self,
        form_template_id: &str,
    ) -> Result<Vec<FieldAssignment>, BackendError> {
        let store = self.read()?;
        let assignments = store.templates.get(form_template_id).ok_or_else(|| {
            BackendError::NotFound(format!("Form template {}", form_template_id))
        })?;

        Ok(assignments
            .iter()
            .map(|assignment| {
                let mut joined = assignment.clone();
                joined.field_library = store.entries.get(&assignment.field_library_id).cloned();
                joined
            })
            .collect())
    }

    async fn submit_lead(&self, payload: &LeadPayload) -> Result<LeadAck, BackendError> {
        let mut store = self.write()?;
        if !store.templates.contains_key(&payload.form_template_id) {
            return Err(BackendError::Rejected(format!(
                "unknown form template {}",
                payload.form_template_id
            )));
        }

        let ack = LeadAck {
            lead_id: Uuid::new_v4(),
            accepted_at: Utc::now(),
        };
        info!(
            "Stored lead {} for form template {}",
            ack.lead_id, payload.form_template_id
        );
        store.leads.push((ack.clone(), payload.clone()));
        Ok(ack)
    }
}
