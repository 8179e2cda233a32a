//! Localization of field texts
//!
//! Every attribute is resolved independently; the first non-empty source
//! wins:
//!
//! | attribute   | custom (assignment)  | translation | entry                            | last resort |
//! |-------------|----------------------|-------------|----------------------------------|-------------|
//! | label       | `customLabel`        | `label`     | `label`                          | `name`      |
//! | placeholder | `customPlaceholder`  | `placeholder` | `defaultPlaceholder`           | empty       |
//! | description | -                    | `description` | `defaultValidation.description` | none       |
//! | options     | -                    | `options`   | `defaultValidation.options`, then `enumList` | empty |
//!
//! A regional language such as `es-MX` uses the `es-MX` translation when it
//! exists and the `es` translation otherwise. A missing translation is never
//! an error.

use crate::models::FieldTranslation;
use crate::resolve::ResolvedField;
use serde::Serialize;

/// Display texts of a field in one language
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedText {
    pub label: String,
    pub placeholder: String,
    pub description: Option<String>,
    pub options: Vec<String>,
}

/// Resolve the display texts of `field` for `language`
pub fn localize(field: &ResolvedField, language: &str) -> LocalizedText {
    let translation = find_translation(field, language);
    let entry = &field.entry;

    let label = first_non_empty([
        field.assignment.custom_label.as_deref(),
        translation.and_then(|t| t.label.as_deref()),
        Some(entry.label.as_str()),
    ])
    .unwrap_or(entry.name.as_str())
    .to_string();

    let placeholder = first_non_empty([
        field.assignment.custom_placeholder.as_deref(),
        translation.and_then(|t| t.placeholder.as_deref()),
        entry.default_placeholder.as_deref(),
    ])
    .unwrap_or_default()
    .to_string();

    let description = first_non_empty([
        translation.and_then(|t| t.description.as_deref()),
        entry.default_validation.description.as_deref(),
    ])
    .map(str::to_string);

    LocalizedText {
        label,
        placeholder,
        description,
        options: resolve_options(field, translation),
    }
}

/// Option list used for rendering and membership checks
pub fn localized_options(field: &ResolvedField, language: &str) -> Vec<String> {
    resolve_options(field, find_translation(field, language))
}

fn resolve_options(field: &ResolvedField, translation: Option<&FieldTranslation>) -> Vec<String> {
    let candidates = [
        translation.map(|t| t.options.as_slice()),
        Some(field.entry.default_validation.options.as_slice()),
        Some(field.entry.enum_list.as_slice()),
    ];
    candidates
        .into_iter()
        .flatten()
        .find(|options| options.iter().any(|o| !o.trim().is_empty()))
        .map(|options| {
            options
                .iter()
                .filter(|o| !o.trim().is_empty())
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}

fn find_translation<'a>(field: &'a ResolvedField, language: &str) -> Option<&'a FieldTranslation> {
    let translations = &field.entry.translations;
    let language = language.trim();
    if language.is_empty() {
        return None;
    }

    if let Some(translation) = translations.get(language) {
        return Some(translation);
    }

    let primary = language
        .split(['-', '_'])
        .next()
        .unwrap_or(language)
        .to_ascii_lowercase();
    translations.get(&primary).or_else(|| {
        translations
            .iter()
            .find(|(code, _)| code.eq_ignore_ascii_case(language))
            .map(|(_, translation)| translation)
    })
}

fn first_non_empty<'a, const N: usize>(candidates: [Option<&'a str>; N]) -> Option<&'a str> {
    candidates
        .into_iter()
        .flatten()
        .find(|value| !value.trim().is_empty())
}
