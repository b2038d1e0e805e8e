//! Record synthesis engine
//!
//! Turns an ordered field list into specialized structural methods:
//!
//! 1. `fields` resolves the field list along the MRO.
//! 2. `cache` fetches (or compiles once) the template for each (family, arity).
//! 3. `specialize` rewrites the template's name tables to the field names.
//! 4. `decorate` attaches the results and `__match_args__`.

pub mod cache;
pub mod config;
pub mod decorate;
pub mod errors;
pub mod fields;
pub mod specialize;
pub mod template;

pub use cache::{CompileHook, TemplateKey, TemplateRegistry};
pub use config::{FamilySet, SynthConfig};
pub use decorate::{Synthesizer, dataklass, dataklass_shared};
pub use errors::SynthError;
pub use fields::{FieldList, check_field_name, resolve_fields};
pub use specialize::specialize;
pub use template::{PlaceholderSlots, Template};
