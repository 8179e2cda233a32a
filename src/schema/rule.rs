//! Per-field validation rules
//!
//! A [`FieldRule`] is an immutable value object built once from a resolved
//! field: the predicate kind, the cardinality bounds and the label used in
//! messages. Checking a value never mutates the rule.

use super::messages::ValidationMessage;
use crate::config::EngineProfile;
use crate::localization::localize;
use crate::models::{FieldDataType, FieldValue};
use crate::resolve::ResolvedField;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[1-9]\d{0,14}$").unwrap());

static NUMBER_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());

/// Built-in format check of a scalar text rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    Plain,
    Email,
    Phone,
    Number,
}

impl TextFormat {
    fn check(&self, value: &str) -> Result<(), ValidationMessage> {
        let (pattern, message) = match self {
            TextFormat::Plain => return Ok(()),
            TextFormat::Email => (&*EMAIL_PATTERN, ValidationMessage::InvalidEmail),
            TextFormat::Phone => (&*PHONE_PATTERN, ValidationMessage::InvalidPhone),
            TextFormat::Number => (&*NUMBER_PATTERN, ValidationMessage::InvalidNumber),
        };
        if pattern.is_match(value) {
            Ok(())
        } else {
            Err(message)
        }
    }
}

/// Predicate of a field rule
#[derive(Debug, Clone)]
pub enum RuleKind {
    /// Scalar string with optional format, pattern and length bounds.
    /// `format` is `Plain` when an admin pattern replaced the type check.
    Text {
        format: TextFormat,
        patterns: Vec<Regex>,
        min_length: Option<usize>,
        max_length: Option<usize>,
    },
    /// Scalar string picked from `options`
    Choice { options: Vec<String> },
    /// `"true"` / `"false"`; only enforced when `must_be_checked`
    Checkbox { must_be_checked: bool },
    /// List of strings. Empty `options` means free-form entries.
    /// `max_items` is an editing bound, never a validation failure.
    List {
        options: Vec<String>,
        min_items: usize,
        max_items: Option<usize>,
    },
}

/// Validation rule of one field
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub field_name: String,
    pub label: String,
    pub required: bool,
    pub kind: RuleKind,
}

impl FieldRule {
    /// Derive the rule of a resolved field
    pub fn from_field(field: &ResolvedField, language: &str, profile: &EngineProfile) -> Self {
        let text = localize(field, language);
        let validation = &field.validation;
        let required = field.is_required();

        let kind = match field.data_type() {
            FieldDataType::Radio | FieldDataType::Select if !text.options.is_empty() => {
                RuleKind::Choice {
                    options: text.options,
                }
            }
            FieldDataType::Checkbox => RuleKind::Checkbox {
                must_be_checked: required && profile.enforce_required_checkbox,
            },
            FieldDataType::Array | FieldDataType::ExtensibleList => {
                let options = if field.data_type() == &FieldDataType::Array {
                    text.options
                } else {
                    Vec::new()
                };
                RuleKind::List {
                    options,
                    min_items: if required {
                        validation.min_items.unwrap_or(1)
                    } else {
                        0
                    },
                    max_items: validation.max_items,
                }
            }
            data_type => text_rule(field, data_type),
        };

        Self {
            field_name: field.name().to_string(),
            label: text.label,
            required,
            kind,
        }
    }

    /// Check a value; a missing value is treated as empty
    pub fn check(&self, value: Option<&FieldValue>) -> Result<(), ValidationMessage> {
        match &self.kind {
            RuleKind::List {
                options,
                min_items,
                ..
            } => {
                let items = match value {
                    None => &[][..],
                    Some(FieldValue::List(items)) => items.as_slice(),
                    Some(FieldValue::Text(_)) => return Err(ValidationMessage::ExpectedList),
                };
                self.check_list(items, options, *min_items)
            }
            kind => {
                let text = match value {
                    None => "",
                    Some(FieldValue::Text(text)) => text.as_str(),
                    Some(FieldValue::List(_)) => return Err(ValidationMessage::ExpectedText),
                };
                self.check_text(kind, text)
            }
        }
    }

    /// Upper bound on list rows for the editing layer
    pub fn max_items(&self) -> Option<usize> {
        match &self.kind {
            RuleKind::List { max_items, .. } => *max_items,
            _ => None,
        }
    }

    fn check_text(&self, kind: &RuleKind, value: &str) -> Result<(), ValidationMessage> {
        if let RuleKind::Checkbox { must_be_checked } = kind {
            if *must_be_checked && value != "true" {
                return Err(ValidationMessage::MustBeChecked);
            }
            return Ok(());
        }

        if value.trim().is_empty() {
            return if self.required {
                Err(ValidationMessage::Required)
            } else {
                Ok(())
            };
        }

        match kind {
            RuleKind::Choice { options } => {
                if options.iter().any(|option| option == value) {
                    Ok(())
                } else {
                    Err(ValidationMessage::NotAnOption)
                }
            }
            RuleKind::Text {
                format,
                patterns,
                min_length,
                max_length,
            } => {
                let length = value.chars().count();
                if let Some(min) = *min_length {
                    if length < min {
                        return Err(ValidationMessage::TooShort { min });
                    }
                }
                if let Some(max) = *max_length {
                    if length > max {
                        return Err(ValidationMessage::TooLong { max });
                    }
                }
                format.check(value)?;
                if patterns.iter().any(|pattern| !pattern.is_match(value)) {
                    return Err(ValidationMessage::PatternMismatch);
                }
                Ok(())
            }
            RuleKind::Checkbox { .. } | RuleKind::List { .. } => Ok(()),
        }
    }

    fn check_list(
        &self,
        items: &[String],
        options: &[String],
        min_items: usize,
    ) -> Result<(), ValidationMessage> {
        // Rows are judged as stored; blank rows are only stripped from the payload
        if !options.is_empty() {
            if let Some(invalid) = items.iter().find(|item| !options.contains(*item)) {
                return Err(ValidationMessage::InvalidItem(invalid.clone()));
            }
        }

        if items.len() < min_items {
            return Err(if items.is_empty() {
                ValidationMessage::Required
            } else {
                ValidationMessage::TooFewItems { min: min_items }
            });
        }

        Ok(())
    }
}

fn text_rule(field: &ResolvedField, data_type: &FieldDataType) -> RuleKind {
    let custom_pattern = field
        .assignment
        .custom_validation
        .as_ref()
        .and_then(|custom| custom.pattern.as_deref())
        .and_then(|pattern| compile_pattern(field, pattern));

    let (format, patterns) = match custom_pattern {
        // The admin override replaces every type-specific check
        Some(pattern) => (TextFormat::Plain, vec![pattern]),
        None => {
            let format = match data_type {
                FieldDataType::Email => TextFormat::Email,
                FieldDataType::Phone => TextFormat::Phone,
                FieldDataType::Number => TextFormat::Number,
                _ => TextFormat::Plain,
            };
            let patterns = field
                .entry
                .default_validation
                .pattern
                .as_deref()
                .and_then(|pattern| compile_pattern(field, pattern))
                .into_iter()
                .collect();
            (format, patterns)
        }
    };

    RuleKind::Text {
        format,
        patterns,
        min_length: field.validation.min_length,
        max_length: field.validation.max_length,
    }
}

fn compile_pattern(field: &ResolvedField, pattern: &str) -> Option<Regex> {
    if pattern.trim().is_empty() {
        return None;
    }
    match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(e) => {
            warn!(
                "Ignoring invalid pattern {:?} on field {}: {}",
                pattern,
                field.name(),
                e
            );
            None
        }
    }
}
