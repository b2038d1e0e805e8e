//! Reserved words of the template language.
//!
//! The template language is the small Python-flavoured language the method generators emit
//! and the template compiler accepts. This registry is the single source of truth for its
//! reserved words.
//!
//! ## Notes
//! - Lookup via [`from_str`] is **case-sensitive**.
//! - `self` and `other` are ordinary identifiers, not keywords.
//!
//! ## Examples
//! ```rust
//! use dataklass_core::lang::keywords::{self, KeywordId};
//!
//! assert_eq!(keywords::from_str("def"), Some(KeywordId::Def));
//! assert_eq!(keywords::from_str("self"), None);
//! ```

use super::registry::{self, LangItemInfo, Since, stable};

/// Stable identifier for every reserved word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordId {
    Def,
    Return,
    Yield,
    If,
    Else,
    Pass,
    Is,
    None,
    True,
    False,
}

/// Metadata for a keyword.
pub type KeywordInfo = LangItemInfo<KeywordId>;

/// Registry of all keywords.
pub const KEYWORDS: &[KeywordInfo] = &[
    stable(KeywordId::Def, "def", &[], "Begin a method definition.", Since(0, 1)),
    stable(KeywordId::Return, "return", &[], "Return from the method.", Since(0, 1)),
    stable(KeywordId::Yield, "yield", &[], "Produce a value from a generator method.", Since(0, 1)),
    stable(KeywordId::If, "if", &[], "Conditional statement.", Since(0, 1)),
    stable(KeywordId::Else, "else", &[], "Alternative branch of `if`.", Since(0, 1)),
    stable(KeywordId::Pass, "pass", &[], "Empty statement.", Since(0, 1)),
    stable(KeywordId::Is, "is", &[], "Identity comparison.", Since(0, 1)),
    stable(KeywordId::None, "None", &[], "The absent value.", Since(0, 1)),
    stable(KeywordId::True, "True", &[], "Boolean true.", Since(0, 1)),
    stable(KeywordId::False, "False", &[], "Boolean false.", Since(0, 1)),
];

/// Canonical spelling.
pub fn as_str(id: KeywordId) -> &'static str {
    info_for(id).canonical
}

/// Full metadata.
///
/// ## Panics
/// - If the registry is missing an entry for `id` (this indicates a programming error).
pub fn info_for(id: KeywordId) -> &'static KeywordInfo {
    registry::info_in(KEYWORDS, id)
}

/// Lookup by spelling.
pub fn from_str(s: &str) -> Option<KeywordId> {
    registry::lookup(KEYWORDS, s)
}
