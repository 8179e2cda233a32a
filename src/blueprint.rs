//! Form blueprints
//!
//! A blueprint is everything the engine derives from one fetched assignment
//! list: the ordered valid fields with their localized texts, the validation
//! schema and the default values. Building one is a pure function of its
//! inputs. [`BlueprintCache`] keys the result by the identity of the fetched
//! list, so a new fetch always produces a fresh blueprint while repeated reads
//! of the same list reuse the cached one.

use crate::config::EngineProfile;
use crate::defaults::default_values;
use crate::localization::{LocalizedText, localize};
use crate::models::{FieldAssignment, FormValues};
use crate::resolve::{DroppedAssignment, ResolvedField, resolve_assignments};
use crate::schema::FormSchema;
use std::sync::Arc;
use tracing::debug;

/// A valid field together with its display texts
#[derive(Debug, Clone)]
pub struct BlueprintField {
    pub field: ResolvedField,
    pub text: LocalizedText,
}

/// Synthesized form: fields, schema and defaults
#[derive(Debug, Clone)]
pub struct FormBlueprint {
    pub language: String,
    pub fields: Vec<BlueprintField>,
    pub schema: FormSchema,
    pub defaults: FormValues,
    pub dropped: Vec<DroppedAssignment>,
}

impl FormBlueprint {
    /// Build the blueprint of a fetched assignment list
    pub fn build(assignments: &[FieldAssignment], language: &str, profile: &EngineProfile) -> Self {
        let resolution = resolve_assignments(assignments);
        let schema = FormSchema::synthesize(&resolution.fields, language, profile);
        let defaults = default_values(&resolution.fields, profile);
        let fields = resolution
            .fields
            .into_iter()
            .map(|field| {
                let text = localize(&field, language);
                BlueprintField { field, text }
            })
            .collect();

        Self {
            language: language.to_string(),
            fields,
            schema,
            defaults,
            dropped: resolution.dropped,
        }
    }

    pub fn field(&self, name: &str) -> Option<&BlueprintField> {
        self.fields.iter().find(|f| f.field.name() == name)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Blueprint cache keyed by the identity of the fetched list
#[derive(Debug, Default)]
pub struct BlueprintCache {
    source: Option<Arc<Vec<FieldAssignment>>>,
    language: String,
    blueprint: Option<Arc<FormBlueprint>>,
}

impl BlueprintCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the blueprint of `source`, rebuilding only when the list or the
    /// language differs from the cached one
    pub fn get_or_build(
        &mut self,
        source: &Arc<Vec<FieldAssignment>>,
        language: &str,
        profile: &EngineProfile,
    ) -> Arc<FormBlueprint> {
        if let (Some(cached_source), Some(blueprint)) = (&self.source, &self.blueprint) {
            if Arc::ptr_eq(cached_source, source) && self.language == language {
                return Arc::clone(blueprint);
            }
        }

        debug!("Synthesizing blueprint for {} assignments", source.len());
        let blueprint = Arc::new(FormBlueprint::build(source, language, profile));
        self.source = Some(Arc::clone(source));
        self.language = language.to_string();
        self.blueprint = Some(Arc::clone(&blueprint));
        blueprint
    }

    /// Share the cached list when a refetch returned the same assignments,
    /// so an unchanged form keeps its blueprint
    pub fn intern(&self, assignments: Vec<FieldAssignment>) -> Arc<Vec<FieldAssignment>> {
        match &self.source {
            Some(cached) if **cached == assignments => Arc::clone(cached),
            _ => Arc::new(assignments),
        }
    }

    pub fn current(&self) -> Option<&Arc<FormBlueprint>> {
        self.blueprint.as_ref()
    }

    pub fn invalidate(&mut self) {
        self.source = None;
        self.blueprint = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FieldDataType, FieldLibraryEntry, FieldValue};

    fn assignments() -> Vec<FieldAssignment> {
        vec![
            FieldAssignment::new("a1", "f1").with_order("2").with_entry(FieldLibraryEntry::new(
                "f1",
                "listField",
                FieldDataType::ExtensibleList,
                "Items",
            )),
            FieldAssignment::new("a2", "f2").with_order("1").with_entry(FieldLibraryEntry::new(
                "f2",
                "checkboxField",
                FieldDataType::Checkbox,
                "Agree",
            )),
            FieldAssignment::new("a3", "missing"),
        ]
    }

    #[test]
    fn test_build_blueprint() {
        let blueprint = FormBlueprint::build(&assignments(), "en", &EngineProfile::simple());

        assert_eq!(blueprint.fields.len(), 2);
        assert_eq!(blueprint.fields[0].field.name(), "checkboxField");
        assert_eq!(blueprint.fields[0].text.label, "Agree");
        assert_eq!(blueprint.dropped.len(), 1);
        assert_eq!(blueprint.defaults.len(), 2);
        assert_eq!(blueprint.defaults["checkboxField"], FieldValue::text("false"));
        assert_eq!(blueprint.defaults["listField"], FieldValue::list([""]));
        assert_eq!(blueprint.schema.rules().len(), 2);
    }

    #[test]
    fn test_cache_keyed_by_list_identity() {
        let profile = EngineProfile::simple();
        let mut cache = BlueprintCache::new();
        let source = Arc::new(assignments());

        let first = cache.get_or_build(&source, "en", &profile);
        let again = cache.get_or_build(&source, "en", &profile);
        assert!(Arc::ptr_eq(&first, &again));

        // Equal content, new fetch: rebuilt
        let refetched = Arc::new(assignments());
        let rebuilt = cache.get_or_build(&refetched, "en", &profile);
        assert!(!Arc::ptr_eq(&first, &rebuilt));

        let spanish = cache.get_or_build(&refetched, "es", &profile);
        assert!(!Arc::ptr_eq(&rebuilt, &spanish));

        cache.invalidate();
        assert!(cache.current().is_none());
    }

    #[test]
    fn test_intern_reuses_unchanged_list() {
        let profile = EngineProfile::simple();
        let mut cache = BlueprintCache::new();

        let source = cache.intern(assignments());
        let first = cache.get_or_build(&source, "en", &profile);

        let refetched = cache.intern(assignments());
        assert!(Arc::ptr_eq(&source, &refetched));
        assert!(Arc::ptr_eq(&first, &cache.get_or_build(&refetched, "en", &profile)));

        let mut changed = assignments();
        changed.pop();
        let changed = cache.intern(changed);
        assert!(!Arc::ptr_eq(&source, &changed));
        assert!(!Arc::ptr_eq(&first, &cache.get_or_build(&changed, "en", &profile)));
    }
}
