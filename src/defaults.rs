//! Default value generation

use crate::config::EngineProfile;
use crate::models::{FieldDataType, FieldValue, FormValues};
use crate::resolve::ResolvedField;

/// Initial value of a field of `data_type`
///
/// List fields start with one blank row so the editor renders an input.
/// Under a profile without blank rows, `array` starts empty while
/// `extensible_list` keeps its blank row.
pub fn default_value(data_type: &FieldDataType, profile: &EngineProfile) -> FieldValue {
    match data_type {
        FieldDataType::Array if !profile.array_defaults_to_blank_row => FieldValue::List(Vec::new()),
        FieldDataType::Array | FieldDataType::ExtensibleList => FieldValue::list([""]),
        FieldDataType::Checkbox => FieldValue::from(false),
        _ => FieldValue::Text(String::new()),
    }
}

/// One default value per resolved field, keyed by field name
pub fn default_values(fields: &[ResolvedField], profile: &EngineProfile) -> FormValues {
    fields
        .iter()
        .map(|field| {
            (
                field.name().to_string(),
                default_value(field.data_type(), profile),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_profile_defaults() {
        let profile = EngineProfile::simple();
        assert_eq!(
            default_value(&FieldDataType::Checkbox, &profile),
            FieldValue::text("false")
        );
        assert_eq!(
            default_value(&FieldDataType::ExtensibleList, &profile),
            FieldValue::list([""])
        );
        assert_eq!(
            default_value(&FieldDataType::Array, &profile),
            FieldValue::list([""])
        );
        assert_eq!(
            default_value(&FieldDataType::Email, &profile),
            FieldValue::text("")
        );
    }

    #[test]
    fn test_dynamic_profile_array_starts_empty() {
        let profile = EngineProfile::dynamic();
        assert_eq!(
            default_value(&FieldDataType::Array, &profile),
            FieldValue::List(Vec::new())
        );
        assert_eq!(
            default_value(&FieldDataType::ExtensibleList, &profile),
            FieldValue::list([""])
        );
        assert_eq!(
            default_value(&FieldDataType::Other("date".to_string()), &profile),
            FieldValue::text("")
        );
    }
}
