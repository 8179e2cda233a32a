//! Schema synthesis
//!
//! Builds one [`FieldRule`] per resolved field and composes them into a
//! [`FormSchema`]. Fields validate independently; there is no cross-field
//! validation. The form is valid iff every field rule passes.

pub mod messages;
pub mod rule;

pub use messages::ValidationMessage;
pub use rule::{FieldRule, RuleKind, TextFormat};

use crate::config::EngineProfile;
use crate::models::{FieldValue, FormValues};
use crate::resolve::ResolvedField;
use serde::Serialize;
use std::collections::BTreeMap;

/// Outcome of validating a whole form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    /// Rendered message per failing field name
    pub errors: BTreeMap<String, String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

/// Whole-form validation schema synthesized from field data
#[derive(Debug, Clone, Default)]
pub struct FormSchema {
    language: String,
    rules: Vec<FieldRule>,
}

impl FormSchema {
    /// Synthesize the schema of `fields`; `language` only affects message text
    pub fn synthesize(fields: &[ResolvedField], language: &str, profile: &EngineProfile) -> Self {
        Self {
            language: language.to_string(),
            rules: fields
                .iter()
                .map(|field| FieldRule::from_field(field, language, profile))
                .collect(),
        }
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    pub fn rule(&self, field_name: &str) -> Option<&FieldRule> {
        self.rules.iter().find(|rule| rule.field_name == field_name)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Validate every field of the form
    pub fn validate(&self, values: &FormValues) -> ValidationReport {
        let errors: BTreeMap<String, String> = self
            .rules
            .iter()
            .filter_map(|rule| {
                self.message_for(rule, values.get(&rule.field_name))
                    .map(|message| (rule.field_name.clone(), message))
            })
            .collect();

        ValidationReport {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Validate one field; `None` when valid or when the field is unknown
    pub fn validate_field(&self, field_name: &str, value: Option<&FieldValue>) -> Option<String> {
        self.rule(field_name)
            .and_then(|rule| self.message_for(rule, value))
    }

    fn message_for(&self, rule: &FieldRule, value: Option<&FieldValue>) -> Option<String> {
        rule.check(value)
            .err()
            .map(|message| message.render(&rule.label, &self.language))
    }
}
