//! Models module for the engine
//!
//! Defines the admin-authored data the engine consumes (field library entries,
//! field assignments) and the runtime value types it produces.

pub mod assignment;
pub mod data_type;
pub mod field;
pub mod value;

pub use assignment::FieldAssignment;
pub use data_type::FieldDataType;
pub use field::{FieldLibraryEntry, FieldTranslation, ValidationOptions};
pub use value::{FieldValue, FormValues};
