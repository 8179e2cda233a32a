//! Field data types
//!
//! The set of data types is open-ended: the field library is edited by
//! administrators and may contain types this engine does not know yet.
//! Unknown types are kept verbatim in [`FieldDataType::Other`] and are
//! validated and rendered as plain text.

use serde::{Deserialize, Serialize};

/// Data type of a field library entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldDataType {
    #[default]
    Text,
    Email,
    Phone,
    Number,
    Radio,
    Select,
    Checkbox,
    Array,
    ExtensibleList,
    /// A type not recognized by this engine
    Other(String),
}

impl FieldDataType {
    /// Wire name of the data type
    pub fn as_str(&self) -> &str {
        match self {
            FieldDataType::Text => "text",
            FieldDataType::Email => "email",
            FieldDataType::Phone => "phone",
            FieldDataType::Number => "number",
            FieldDataType::Radio => "radio",
            FieldDataType::Select => "select",
            FieldDataType::Checkbox => "checkbox",
            FieldDataType::Array => "array",
            FieldDataType::ExtensibleList => "extensible_list",
            FieldDataType::Other(name) => name,
        }
    }

    /// Whether values of this type are lists of strings
    pub fn is_list(&self) -> bool {
        matches!(self, FieldDataType::Array | FieldDataType::ExtensibleList)
    }

    /// Whether values of this type are picked from an option list
    pub fn is_choice(&self) -> bool {
        matches!(self, FieldDataType::Radio | FieldDataType::Select)
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, FieldDataType::Other(_))
    }
}

impl From<&str> for FieldDataType {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => FieldDataType::Text,
            "email" => FieldDataType::Email,
            "phone" => FieldDataType::Phone,
            "number" => FieldDataType::Number,
            "radio" => FieldDataType::Radio,
            "select" => FieldDataType::Select,
            "checkbox" => FieldDataType::Checkbox,
            "array" => FieldDataType::Array,
            "extensible_list" | "extensible-list" => FieldDataType::ExtensibleList,
            _ => FieldDataType::Other(value.to_string()),
        }
    }
}

impl From<String> for FieldDataType {
    fn from(value: String) -> Self {
        FieldDataType::from(value.as_str())
    }
}

impl From<FieldDataType> for String {
    fn from(value: FieldDataType) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for FieldDataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
