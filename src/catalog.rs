//! Form catalog documents
//!
//! A catalog bundles a field library and the templates assigning its fields,
//! as exported by the admin tooling. Catalogs are read from YAML or JSON and
//! fed into a backend such as [`InMemoryFormBackend`](crate::storage::InMemoryFormBackend).
//!
//! ```yaml
//! fields:
//!   - id: f-email
//!     name: email
//!     dataType: email
//!     label: Email
//! templates:
//!   - id: card-1
//!     assignments:
//!       - id: a-1
//!         fieldLibraryId: f-email
//!         isRequired: true
//!         order: "1"
//! ```

use crate::models::{FieldAssignment, FieldLibraryEntry};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Error reading a catalog document
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to parse YAML catalog: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Failed to parse JSON catalog: {0}")]
    Json(#[from] serde_json::Error),
}

/// Template and the assignments attached to it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDefinition {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub assignments: Vec<FieldAssignment>,
}

/// Field library plus templates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormCatalog {
    #[serde(default)]
    pub fields: Vec<FieldLibraryEntry>,
    #[serde(default)]
    pub templates: Vec<TemplateDefinition>,
}

impl FormCatalog {
    pub fn from_yaml_str(content: &str) -> Result<Self, CatalogError> {
        let catalog: FormCatalog = serde_yaml::from_str(content)?;
        catalog.log_summary();
        Ok(catalog)
    }

    pub fn from_json_str(content: &str) -> Result<Self, CatalogError> {
        let catalog: FormCatalog = serde_json::from_str(content)?;
        catalog.log_summary();
        Ok(catalog)
    }

    pub fn template(&self, template_id: &str) -> Option<&TemplateDefinition> {
        self.templates.iter().find(|t| t.id == template_id)
    }

    /// Assignments whose `fieldLibraryId` has no entry in this catalog
    pub fn orphaned_assignments(&self) -> Vec<(&str, &FieldAssignment)> {
        self.templates
            .iter()
            .flat_map(|template| {
                template
                    .assignments
                    .iter()
                    .map(move |assignment| (template.id.as_str(), assignment))
            })
            .filter(|(_, assignment)| {
                !self
                    .fields
                    .iter()
                    .any(|entry| entry.id == assignment.field_library_id)
            })
            .collect()
    }

    fn log_summary(&self) {
        info!(
            "Loaded catalog with {} fields and {} templates",
            self.fields.len(),
            self.templates.len()
        );
        for (template_id, assignment) in self.orphaned_assignments() {
            warn!(
                "Assignment {} of template {} references unknown field {}",
                assignment.id, template_id, assignment.field_library_id
            );
        }
    }
}
