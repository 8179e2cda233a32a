//! Validation messages
//!
//! Messages are rendered in English, Spanish or German; any other language
//! gets the English text.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reason a field value failed its rule
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ValidationMessage {
    #[error("value is required")]
    Required,
    #[error("invalid email address")]
    InvalidEmail,
    #[error("invalid phone number")]
    InvalidPhone,
    #[error("only digits are allowed")]
    InvalidNumber,
    #[error("value does not match the expected format")]
    PatternMismatch,
    #[error("must be at least {min} characters")]
    TooShort { min: usize },
    #[error("must be at most {max} characters")]
    TooLong { max: usize },
    #[error("value is not one of the available options")]
    NotAnOption,
    #[error("'{0}' is not one of the available options")]
    InvalidItem(String),
    #[error("at least {min} entries are required")]
    TooFewItems { min: usize },
    #[error("expected a single value")]
    ExpectedText,
    #[error("expected a list of values")]
    ExpectedList,
    #[error("must be checked")]
    MustBeChecked,
}

impl ValidationMessage {
    /// Render the message for a field label in `language`
    pub fn render(&self, label: &str, language: &str) -> String {
        match primary_language(language).as_str() {
            "es" => self.render_es(label),
            "de" => self.render_de(label),
            _ => self.render_en(label),
        }
    }

    fn render_en(&self, label: &str) -> String {
        match self {
            ValidationMessage::Required => format!("{label} is required"),
            ValidationMessage::InvalidEmail => format!("{label} must be a valid email address"),
            ValidationMessage::InvalidPhone => format!("{label} must be a valid phone number"),
            ValidationMessage::InvalidNumber => format!("{label} may only contain digits"),
            ValidationMessage::PatternMismatch => format!("{label} has an invalid format"),
            ValidationMessage::TooShort { min } => {
                format!("{label} must be at least {min} characters")
            }
            ValidationMessage::TooLong { max } => {
                format!("{label} must be at most {max} characters")
            }
            ValidationMessage::NotAnOption => format!("Please choose a valid option for {label}"),
            ValidationMessage::InvalidItem(item) => {
                format!("'{item}' is not a valid option for {label}")
            }
            ValidationMessage::TooFewItems { min } => {
                format!("{label} needs at least {min} entries")
            }
            ValidationMessage::ExpectedText => format!("{label} expects a single value"),
            ValidationMessage::ExpectedList => format!("{label} expects a list of values"),
            ValidationMessage::MustBeChecked => format!("{label} must be checked"),
        }
    }

    fn render_es(&self, label: &str) -> String {
        match self {
            ValidationMessage::Required => format!("{label} es obligatorio"),
            ValidationMessage::InvalidEmail => {
                format!("{label} debe ser un correo electrónico válido")
            }
            ValidationMessage::InvalidPhone => format!("{label} debe ser un teléfono válido"),
            ValidationMessage::InvalidNumber => format!("{label} solo puede contener dígitos"),
            ValidationMessage::PatternMismatch => format!("{label} tiene un formato no válido"),
            ValidationMessage::TooShort { min } => {
                format!("{label} debe tener al menos {min} caracteres")
            }
            ValidationMessage::TooLong { max } => {
                format!("{label} debe tener como máximo {max} caracteres")
            }
            ValidationMessage::NotAnOption => {
                format!("Elige una opción válida para {label}")
            }
            ValidationMessage::InvalidItem(item) => {
                format!("'{item}' no es una opción válida para {label}")
            }
            ValidationMessage::TooFewItems { min } => {
                format!("{label} necesita al menos {min} elementos")
            }
            ValidationMessage::ExpectedText => format!("{label} espera un único valor"),
            ValidationMessage::ExpectedList => format!("{label} espera una lista de valores"),
            ValidationMessage::MustBeChecked => format!("{label} debe estar marcado"),
        }
    }

    fn render_de(&self, label: &str) -> String {
        match self {
            ValidationMessage::Required => format!("{label} ist ein Pflichtfeld"),
            ValidationMessage::InvalidEmail => {
                format!("{label} muss eine gültige E-Mail-Adresse sein")
            }
            ValidationMessage::InvalidPhone => {
                format!("{label} muss eine gültige Telefonnummer sein")
            }
            ValidationMessage::InvalidNumber => format!("{label} darf nur Ziffern enthalten"),
            ValidationMessage::PatternMismatch => format!("{label} hat ein ungültiges Format"),
            ValidationMessage::TooShort { min } => {
                format!("{label} muss mindestens {min} Zeichen lang sein")
            }
            ValidationMessage::TooLong { max } => {
                format!("{label} darf höchstens {max} Zeichen lang sein")
            }
            ValidationMessage::NotAnOption => {
                format!("Bitte eine gültige Option für {label} wählen")
            }
            ValidationMessage::InvalidItem(item) => {
                format!("'{item}' ist keine gültige Option für {label}")
            }
            ValidationMessage::TooFewItems { min } => {
                format!("{label} benötigt mindestens {min} Einträge")
            }
            ValidationMessage::ExpectedText => format!("{label} erwartet einen einzelnen Wert"),
            ValidationMessage::ExpectedList => format!("{label} erwartet eine Liste von Werten"),
            ValidationMessage::MustBeChecked => format!("{label} muss angehakt sein"),
        }
    }
}

fn primary_language(language: &str) -> String {
    language
        .trim()
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_languages() {
        let message = ValidationMessage::TooFewItems { min: 2 };
        assert_eq!(message.render("Tags", "en"), "Tags needs at least 2 entries");
        assert_eq!(message.render("Tags", "es-ES"), "Tags necesita al menos 2 elementos");
        assert_eq!(message.render("Tags", "de"), "Tags benötigt mindestens 2 Einträge");
        assert_eq!(message.render("Tags", "fr"), "Tags needs at least 2 entries");
    }
}
