//! Shareable metadata for `dataklass_core::lang` registries.
//!
//! Every registry in this crate is a `const` table of [`LangItemInfo`] entries (or a wrapper around
//! one). This module provides the small metadata types reused across them.
//!
//! ## Notes
//! - These types are `Copy` so registries can live in `const` tables.
//! - Metadata is for tooling, docs, and diagnostics; syntax rules live in the template lexer/parser.

/// Identify the crate version a vocabulary item is available since, as `(major, minor)`.
///
/// ## Examples
/// ```rust
/// use dataklass_core::lang::registry::Since;
///
/// let since = Since(0, 1);
/// assert_eq!(since.to_string(), "0.1");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Since(pub u16, pub u16);

impl std::fmt::Display for Since {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.0, self.1)
    }
}

/// Describe the lifecycle status of a vocabulary item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stability {
    Stable,
    Draft,
    Deprecated,
}

/// Shared metadata shape for registry items.
///
/// - stable identity (`id`)
/// - accepted spellings (`canonical` + `aliases`)
/// - documentation (`description`)
/// - provenance (`since`, `stability`)
///
/// ## Notes
/// - `description` is mandatory to keep docs/tooling consistent.
#[derive(Debug, Clone, Copy)]
pub struct LangItemInfo<Id> {
    pub id: Id,
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
    pub description: &'static str,
    pub since: Since,
    pub stability: Stability,
}

impl<Id: Copy + PartialEq> LangItemInfo<Id> {
    /// Return true if `spelling` is the canonical spelling or one of the aliases.
    pub fn matches(&self, spelling: &str) -> bool {
        self.canonical == spelling || self.aliases.contains(&spelling)
    }
}

/// Resolve a spelling against a registry table (canonical spellings win over aliases).
///
/// ## Parameters
/// - `table`: the registry to search.
/// - `spelling`: candidate spelling.
///
/// ## Returns
/// - `Some(id)` when a canonical spelling or alias matches.
pub fn lookup<Id: Copy + PartialEq>(table: &'static [LangItemInfo<Id>], spelling: &str) -> Option<Id> {
    if let Some(info) = table.iter().find(|i| i.canonical == spelling) {
        return Some(info.id);
    }
    table.iter().find(|i| i.aliases.contains(&spelling)).map(|i| i.id)
}

/// Find the metadata entry for `id`.
///
/// ## Panics
/// - If the registry is missing an entry for `id` (this indicates a programming error).
pub fn info_in<Id: Copy + PartialEq + std::fmt::Debug>(
    table: &'static [LangItemInfo<Id>],
    id: Id,
) -> &'static LangItemInfo<Id> {
    table
        .iter()
        .find(|i| i.id == id)
        .unwrap_or_else(|| panic!("INVARIANT: registry entry missing for {id:?}"))
}

/// Build a stable registry entry.
pub const fn stable<Id>(
    id: Id,
    canonical: &'static str,
    aliases: &'static [&'static str],
    description: &'static str,
    since: Since,
) -> LangItemInfo<Id> {
    LangItemInfo {
        id,
        canonical,
        aliases,
        description,
        since,
        stability: Stability::Stable,
    }
}
