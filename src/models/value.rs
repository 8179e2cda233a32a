//! Runtime field values

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Current value of one field: a scalar string or a list of strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldValue::List(values.into_iter().map(Into::into).collect())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(value) => Some(value),
            FieldValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(values) => Some(values),
            FieldValue::Text(_) => None,
        }
    }

    /// Whether the value carries no user input
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(value) => value.trim().is_empty(),
            FieldValue::List(values) => values.iter().all(|v| v.trim().is_empty()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(values: Vec<String>) -> Self {
        FieldValue::List(values)
    }
}

impl From<bool> for FieldValue {
    fn from(checked: bool) -> Self {
        FieldValue::Text(checked.to_string())
    }
}

/// Values of a form keyed by field name
pub type FormValues = BTreeMap<String, FieldValue>;
