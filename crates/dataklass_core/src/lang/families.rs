//! Method families.
//!
//! A method family is one of the structural methods the engine knows how to synthesize. Each
//! family has a short spelling (used in configuration, CLI arguments, and
//! `#[dataklass(skip(...))]`) and the dunder it is attached under.

use super::magic_methods::{self, MagicMethodId};
use super::registry::{self, LangItemInfo, Since, stable};

/// One synthesizable structural method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MethodFamily {
    Init,
    Repr,
    Eq,
    Iter,
    Hash,
}

/// All families, in attachment order.
pub const FAMILIES: [MethodFamily; 5] = [
    MethodFamily::Init,
    MethodFamily::Repr,
    MethodFamily::Eq,
    MethodFamily::Iter,
    MethodFamily::Hash,
];

/// Metadata for a family's short spelling.
pub type FamilyInfo = LangItemInfo<MethodFamily>;

/// Registry of family spellings.
pub const FAMILY_NAMES: &[FamilyInfo] = &[
    stable(MethodFamily::Init, "init", &["constructor"], "Positional constructor.", Since(0, 1)),
    stable(MethodFamily::Repr, "repr", &["representation"], "Textual representation.", Since(0, 1)),
    stable(MethodFamily::Eq, "eq", &["equality"], "Same-class field-wise equality.", Since(0, 1)),
    stable(MethodFamily::Iter, "iter", &["iteration"], "Field values in order.", Since(0, 1)),
    stable(MethodFamily::Hash, "hash", &["hashing"], "Hash over field values.", Since(0, 1)),
];

impl MethodFamily {
    /// Short spelling (`"init"`, `"repr"`, ...).
    pub fn as_str(self) -> &'static str {
        registry::info_in(FAMILY_NAMES, self).canonical
    }

    /// Resolve a short spelling or alias.
    pub fn from_str(s: &str) -> Option<Self> {
        registry::lookup(FAMILY_NAMES, s)
    }

    /// The magic name this family is attached under.
    pub fn magic(self) -> MagicMethodId {
        match self {
            MethodFamily::Init => MagicMethodId::Init,
            MethodFamily::Repr => MagicMethodId::Repr,
            MethodFamily::Eq => MagicMethodId::Eq,
            MethodFamily::Iter => MagicMethodId::Iter,
            MethodFamily::Hash => MagicMethodId::Hash,
        }
    }

    /// The dunder spelling (`"__init__"`, ...).
    pub fn dunder(self) -> &'static str {
        magic_methods::as_str(self.magic())
    }

    /// Families synthesized unless configured otherwise.
    pub fn enabled_by_default(self) -> bool {
        matches!(self, MethodFamily::Init | MethodFamily::Repr | MethodFamily::Eq)
    }
}

impl std::fmt::Display for MethodFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dunders_follow_magic_registry() {
        assert_eq!(MethodFamily::Init.dunder(), "__init__");
        assert_eq!(MethodFamily::Hash.dunder(), "__hash__");
    }

    #[test]
    fn aliases_resolve() {
        assert_eq!(MethodFamily::from_str("equality"), Some(MethodFamily::Eq));
        assert_eq!(MethodFamily::from_str("Eq"), None);
    }

    #[test]
    fn iter_and_hash_are_opt_in() {
        let defaults: Vec<_> = FAMILIES.into_iter().filter(|f| f.enabled_by_default()).collect();
        assert_eq!(defaults, vec![MethodFamily::Init, MethodFamily::Repr, MethodFamily::Eq]);
    }
}
