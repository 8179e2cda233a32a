//! Assignment resolution
//!
//! Turns the raw list returned by the fetch collaborator into the ordered list
//! of valid fields. Assignments whose library entry is gone, whose entry has
//! no name, or whose name repeats an earlier field are dropped and reported,
//! never treated as fatal.

use crate::models::{FieldAssignment, FieldDataType, FieldLibraryEntry, ValidationOptions};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Why an assignment was excluded from the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// The referenced field library entry does not exist
    MissingEntry,
    /// The referenced entry has an empty `name`
    EmptyName,
    /// Another field earlier in the form already uses this name
    DuplicateName(String),
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DropReason::MissingEntry => write!(f, "referenced field library entry is missing"),
            DropReason::EmptyName => write!(f, "field library entry has an empty name"),
            DropReason::DuplicateName(name) => write!(f, "field name '{}' is already used", name),
        }
    }
}

/// Assignment excluded during resolution
#[derive(Debug, Clone)]
pub struct DroppedAssignment {
    pub assignment_id: String,
    pub field_library_id: String,
    pub reason: DropReason,
}

/// A valid assignment paired with its library entry
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedField {
    pub assignment: FieldAssignment,
    pub entry: FieldLibraryEntry,
    /// Custom validation merged over the entry defaults
    pub validation: ValidationOptions,
}

impl ResolvedField {
    pub fn name(&self) -> &str {
        &self.entry.name
    }

    pub fn data_type(&self) -> &FieldDataType {
        &self.entry.data_type
    }

    pub fn is_required(&self) -> bool {
        self.assignment.is_required
    }
}

/// Result of resolving a fetched assignment list
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub fields: Vec<ResolvedField>,
    pub dropped: Vec<DroppedAssignment>,
}

/// Resolve, filter and order fetched assignments
///
/// Ordering is stable and ascending by the parsed `order`; ties keep their
/// input order. Duplicate names are resolved after sorting, so the field that
/// renders first keeps the name.
pub fn resolve_assignments(assignments: &[FieldAssignment]) -> Resolution {
    let mut resolution = Resolution::default();
    let mut candidates = Vec::with_capacity(assignments.len());

    for assignment in assignments {
        let Some(entry) = assignment.field_library.as_ref() else {
            drop_assignment(&mut resolution, assignment, DropReason::MissingEntry);
            continue;
        };
        if !entry.has_valid_name() {
            drop_assignment(&mut resolution, assignment, DropReason::EmptyName);
            continue;
        }
        candidates.push((assignment, entry));
    }

    candidates.sort_by_key(|(assignment, _)| assignment.sort_key());

    let mut seen = HashSet::new();
    for (assignment, entry) in candidates {
        let name = entry.name.trim().to_string();
        if !seen.insert(name.clone()) {
            drop_assignment(&mut resolution, assignment, DropReason::DuplicateName(name));
            continue;
        }

        let validation = match &assignment.custom_validation {
            Some(custom) => custom.merged_over(&entry.default_validation),
            None => entry.default_validation.clone(),
        };
        let mut entry = entry.clone();
        entry.name = name;
        let mut assignment = assignment.clone();
        assignment.field_library = None;

        resolution.fields.push(ResolvedField {
            assignment,
            entry,
            validation,
        });
    }

    debug!(
        "Resolved {} fields ({} dropped)",
        resolution.fields.len(),
        resolution.dropped.len()
    );

    resolution
}

fn drop_assignment(resolution: &mut Resolution, assignment: &FieldAssignment, reason: DropReason) {
    warn!(
        "Skipping field assignment {} (field library {}): {}",
        assignment.id, assignment.field_library_id, reason
    );
    resolution.dropped.push(DroppedAssignment {
        assignment_id: assignment.id.clone(),
        field_library_id: assignment.field_library_id.clone(),
        reason,
    });
}
