//! Field descriptors for the rendering layer

use crate::models::{FieldDataType, FieldValue};
use serde::Serialize;

/// Everything a UI needs to render one field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub field_name: String,
    pub data_type: FieldDataType,
    pub resolved_label: String,
    pub resolved_placeholder: String,
    pub resolved_description: Option<String>,
    pub resolved_options: Vec<String>,
    pub is_required: bool,
    pub current_value: FieldValue,
    pub current_error: Option<String>,
    pub order: i64,
    pub section: Option<String>,
    /// Row label and placeholder of list editors
    pub item_label: Option<String>,
    pub item_placeholder: Option<String>,
    /// Row limit of list editors
    pub max_items: Option<usize>,
}

/// Descriptors sharing one section
#[derive(Debug, Clone, PartialEq)]
pub struct SectionGroup<'a> {
    pub section: Option<&'a str>,
    pub fields: Vec<&'a FieldDescriptor>,
}

/// Group descriptors by section, ordered by each section's first field
pub fn group_by_section(descriptors: &[FieldDescriptor]) -> Vec<SectionGroup<'_>> {
    let mut groups: Vec<SectionGroup<'_>> = Vec::new();
    for descriptor in descriptors {
        let section = descriptor.section.as_deref();
        match groups.iter_mut().find(|group| group.section == section) {
            Some(group) => group.fields.push(descriptor),
            None => groups.push(SectionGroup {
                section,
                fields: vec![descriptor],
            }),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(name: &str, section: Option<&str>) -> FieldDescriptor {
        FieldDescriptor {
            field_name: name.to_string(),
            data_type: FieldDataType::Text,
            resolved_label: name.to_string(),
            resolved_placeholder: String::new(),
            resolved_description: None,
            resolved_options: Vec::new(),
            is_required: false,
            current_value: FieldValue::text(""),
            current_error: None,
            order: 0,
            section: section.map(str::to_string),
            item_label: None,
            item_placeholder: None,
            max_items: None,
        }
    }

    #[test]
    fn test_group_by_first_appearance() {
        let descriptors = vec![
            descriptor("firstName", Some("About you")),
            descriptor("budget", None),
            descriptor("email", Some("About you")),
            descriptor("notes", Some("Project")),
        ];

        let groups = group_by_section(&descriptors);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].section, Some("About you"));
        let names: Vec<_> = groups[0].fields.iter().map(|d| d.field_name.as_str()).collect();
        assert_eq!(names, vec!["firstName", "email"]);
        assert_eq!(groups[1].section, None);
        assert_eq!(groups[2].section, Some("Project"));
    }
}
