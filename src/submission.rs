//! Submission assembly
//!
//! Maps validated form values into the payload accepted by the lead store.
//! The standard lead columns (`firstName`, `lastName`, `email`, `phone`) are
//! written twice: inside `formData` and as top-level keys, because the lead
//! store indexes leads by those columns independently of the dynamic data.

use crate::models::{FieldValue, FormValues};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Field names mirrored to top-level payload keys
pub const STANDARD_FIELDS: [&str; 4] = ["firstName", "lastName", "email", "phone"];

/// Payload sent to the lead store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadPayload {
    pub form_template_id: String,
    pub site_id: String,
    pub form_data: FormValues,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub language: String,
    pub submitted_at: DateTime<Utc>,
}

/// Acknowledgement returned by the lead store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadAck {
    pub lead_id: Uuid,
    pub accepted_at: DateTime<Utc>,
}

/// Identity of the form being submitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormTarget {
    pub form_template_id: String,
    pub site_id: String,
}

impl FormTarget {
    pub fn new(form_template_id: impl Into<String>, site_id: impl Into<String>) -> Self {
        Self {
            form_template_id: form_template_id.into(),
            site_id: site_id.into(),
        }
    }
}

/// Assemble the payload of a submission
///
/// Blank rows are removed from list values; scalar values are passed through
/// unchanged. A standard field is mirrored only when it holds a non-blank
/// scalar value.
pub fn assemble_payload(
    target: &FormTarget,
    values: &FormValues,
    language: &str,
    submitted_at: DateTime<Utc>,
) -> LeadPayload {
    let form_data: FormValues = values
        .iter()
        .map(|(name, value)| (name.clone(), normalize(value)))
        .collect();

    let standard = |name: &str| {
        form_data
            .get(name)
            .and_then(FieldValue::as_text)
            .filter(|value| !value.trim().is_empty())
            .map(str::to_string)
    };

    LeadPayload {
        form_template_id: target.form_template_id.clone(),
        site_id: target.site_id.clone(),
        first_name: standard(STANDARD_FIELDS[0]),
        last_name: standard(STANDARD_FIELDS[1]),
        email: standard(STANDARD_FIELDS[2]),
        phone: standard(STANDARD_FIELDS[3]),
        form_data,
        language: language.to_string(),
        submitted_at,
    }
}

fn normalize(value: &FieldValue) -> FieldValue {
    match value {
        FieldValue::Text(text) => FieldValue::Text(text.clone()),
        FieldValue::List(items) => FieldValue::List(
            items
                .iter()
                .filter(|item| !item.trim().is_empty())
                .cloned()
                .collect(),
        ),
    }
}
