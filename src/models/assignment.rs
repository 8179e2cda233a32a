//! Field assignment model

use super::field::{FieldLibraryEntry, ValidationOptions};
use serde::{Deserialize, Serialize};

/// Binding of a field library entry into one form template
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldAssignment {
    pub id: String,
    pub field_library_id: String,
    #[serde(default)]
    pub is_required: bool,
    /// Numeric string; unparsable values sort as 0
    #[serde(default)]
    pub order: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_validation: Option<ValidationOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Joined library entry; `None` when the referenced entry no longer exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_library: Option<FieldLibraryEntry>,
}

impl FieldAssignment {
    pub fn new(id: impl Into<String>, field_library_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            field_library_id: field_library_id.into(),
            ..Default::default()
        }
    }

    pub fn required(mut self, is_required: bool) -> Self {
        self.is_required = is_required;
        self
    }

    pub fn with_order(mut self, order: impl Into<String>) -> Self {
        self.order = order.into();
        self
    }

    pub fn with_custom_label(mut self, label: impl Into<String>) -> Self {
        self.custom_label = Some(label.into());
        self
    }

    pub fn with_custom_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.custom_placeholder = Some(placeholder.into());
        self
    }

    pub fn with_custom_validation(mut self, validation: ValidationOptions) -> Self {
        self.custom_validation = Some(validation);
        self
    }

    pub fn in_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    pub fn with_entry(mut self, entry: FieldLibraryEntry) -> Self {
        self.field_library = Some(entry);
        self
    }

    /// Parsed sort key
    pub fn sort_key(&self) -> i64 {
        self.order.trim().parse().unwrap_or(0)
    }
}
