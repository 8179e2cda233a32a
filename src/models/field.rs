//! Field library entry model
//!
//! A field library entry is the reusable blueprint of a form field. It is pure
//! data authored by administrators and shared by any number of templates.

use super::data_type::FieldDataType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Type-specific validation and presentation options of a field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOptions {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

impl ValidationOptions {
    /// Merge these (custom) options over `base`.
    ///
    /// Every scalar option set here wins over the base value. Option lists are
    /// never overridden per assignment, so `options` always comes from `base`.
    pub fn merged_over(&self, base: &ValidationOptions) -> ValidationOptions {
        ValidationOptions {
            options: base.options.clone(),
            min_items: self.min_items.or(base.min_items),
            max_items: self.max_items.or(base.max_items),
            item_label: self.item_label.clone().or_else(|| base.item_label.clone()),
            item_placeholder: self
                .item_placeholder
                .clone()
                .or_else(|| base.item_placeholder.clone()),
            description: self
                .description
                .clone()
                .or_else(|| base.description.clone()),
            pattern: self.pattern.clone().or_else(|| base.pattern.clone()),
            min_length: self.min_length.or(base.min_length),
            max_length: self.max_length.or(base.max_length),
        }
    }
}

/// Translated texts of a field for one language
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldTranslation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

/// Reusable field definition from the shared field library
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldLibraryEntry {
    pub id: String,
    /// Key under which the value is stored and submitted
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub data_type: FieldDataType,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_placeholder: Option<String>,
    #[serde(default)]
    pub default_validation: ValidationOptions,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub translations: HashMap<String, FieldTranslation>,
    /// Option list used by `select` fields authored through the enum editor
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_list: Vec<String>,
}

impl FieldLibraryEntry {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        data_type: FieldDataType,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            data_type,
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.default_placeholder = Some(placeholder.into());
        self
    }

    pub fn with_validation(mut self, validation: ValidationOptions) -> Self {
        self.default_validation = validation;
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_validation.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_enum_list<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_list = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_translation(
        mut self,
        language: impl Into<String>,
        translation: FieldTranslation,
    ) -> Self {
        self.translations.insert(language.into(), translation);
        self
    }

    /// An entry without a usable name cannot hold a value
    pub fn has_valid_name(&self) -> bool {
        !self.name.trim().is_empty()
    }
}
