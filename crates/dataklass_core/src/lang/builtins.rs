//! Builtin globals of the template language.
//!
//! Templates resolve these through their `names` table, the same table that holds attribute
//! names. Specialization never touches these slots.
//!
//! ## Examples
//! ```rust
//! use dataklass_core::lang::builtins::{self, BuiltinId};
//!
//! assert_eq!(builtins::from_str("hash"), Some(BuiltinId::Hash));
//! assert_eq!(builtins::as_str(BuiltinId::NotImplemented), "NotImplemented");
//! ```

use super::registry::{self, LangItemInfo, Since, stable};

/// Stable identifier for a builtin global.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinId {
    Type,
    Hash,
    Repr,
    NotImplemented,
}

/// Metadata for a builtin global.
pub type BuiltinInfo = LangItemInfo<BuiltinId>;

/// Registry of builtin globals.
pub const BUILTINS: &[BuiltinInfo] = &[
    stable(BuiltinId::Type, "type", &[], "Return the runtime class of a value.", Since(0, 1)),
    stable(BuiltinId::Hash, "hash", &[], "Hash a value.", Since(0, 1)),
    stable(BuiltinId::Repr, "repr", &[], "Textual representation of a value.", Since(0, 1)),
    stable(
        BuiltinId::NotImplemented,
        "NotImplemented",
        &[],
        "Signal that a comparison is not supported by this operand.",
        Since(0, 1),
    ),
];

/// Canonical spelling.
pub fn as_str(id: BuiltinId) -> &'static str {
    info_for(id).canonical
}

/// Full metadata.
pub fn info_for(id: BuiltinId) -> &'static BuiltinInfo {
    registry::info_in(BUILTINS, id)
}

/// Lookup by spelling.
pub fn from_str(name: &str) -> Option<BuiltinId> {
    registry::lookup(BUILTINS, name)
}
