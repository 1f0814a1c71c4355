//! Form engine: an accordion of sections.
//!
//! Related modules:
//! - `field.rs`   : field kinds, rules and `FieldSpec`
//! - `handle.rs`  : `FormHandle` and the schema-driven `SchemaForm`
//! - `section.rs` : `FormSection` (fields + submit + custom table)
//! - `table.rs`   : `TableSection` (editable rows with mapping)
//! - `mapping.rs` : cross-population lookups
//! - `engine.rs`  : `FormEngine` accordion
mod engine;
mod field;
mod handle;
mod mapping;
mod section;
mod table;

pub use engine::{FormEngine, Section};
pub use field::{ControlKind, FieldKind, FieldSpec, Rule, Validator};
pub use handle::{FormHandle, FormValues, SchemaForm, ValidationResult};
pub use mapping::{MappingConfig, MappingRule};
pub use section::{CustomTable, FormSection, SubmitOutcome};
pub use table::TableSection;
