//! Recognized magic (dunder) spellings.
//!
//! Method-family dunders (`__init__`, `__repr__`, ...) are the names synthesized methods are
//! attached under; the remaining entries are attributes the runtime answers itself.

use super::registry::{self, LangItemInfo, Since, stable};

/// Stable identifier for magic names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MagicMethodId {
    Init,
    Repr,
    Eq,
    Iter,
    Hash,
    MatchArgs,
    Class,
    Name,
}

/// Metadata entry for a magic name.
pub type MagicMethodInfo = LangItemInfo<MagicMethodId>;

/// Registry of recognized magic names.
pub const MAGIC_METHODS: &[MagicMethodInfo] = &[
    stable(MagicMethodId::Init, "__init__", &[], "Positional constructor.", Since(0, 1)),
    stable(MagicMethodId::Repr, "__repr__", &[], "Textual representation.", Since(0, 1)),
    stable(MagicMethodId::Eq, "__eq__", &[], "Equality comparison.", Since(0, 1)),
    stable(MagicMethodId::Iter, "__iter__", &[], "Iterate over field values.", Since(0, 1)),
    stable(MagicMethodId::Hash, "__hash__", &[], "Hash over field values.", Since(0, 1)),
    stable(
        MagicMethodId::MatchArgs,
        "__match_args__",
        &[],
        "Field order for positional pattern matching.",
        Since(0, 1),
    ),
    stable(MagicMethodId::Class, "__class__", &[], "Runtime class of a value.", Since(0, 1)),
    stable(MagicMethodId::Name, "__name__", &[], "Name of a class.", Since(0, 1)),
];

/// Resolve a magic name to its stable id.
pub fn from_str(name: &str) -> Option<MagicMethodId> {
    registry::lookup(MAGIC_METHODS, name)
}

/// Return the canonical spelling for a magic name.
pub fn as_str(id: MagicMethodId) -> &'static str {
    info_for(id).canonical
}

/// Return the metadata entry for a magic name.
pub fn info_for(id: MagicMethodId) -> &'static MagicMethodInfo {
    registry::info_in(MAGIC_METHODS, id)
}

/// Check whether `name` has the `__dunder__` shape.
pub fn is_dunder(name: &str) -> bool {
    name.len() > 4 && name.starts_with("__") && name.ends_with("__")
}
