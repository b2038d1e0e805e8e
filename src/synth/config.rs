//! Synthesis configuration
//!
//! Which method families to synthesize and whether to set `__match_args__`.

use dataklass_core::{FAMILIES, MethodFamily};

/// Set of method families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FamilySet(u8);

impl FamilySet {
    pub const EMPTY: FamilySet = FamilySet(0);

    fn bit(family: MethodFamily) -> u8 {
        1 << family as u8
    }

    /// Every family.
    pub fn all() -> Self {
        FAMILIES.into_iter().collect()
    }

    /// Families enabled unless configured otherwise (init, repr, eq).
    pub fn defaults() -> Self {
        FAMILIES.into_iter().filter(|f| f.enabled_by_default()).collect()
    }

    pub fn contains(self, family: MethodFamily) -> bool {
        self.0 & Self::bit(family) != 0
    }

    pub fn insert(&mut self, family: MethodFamily) {
        self.0 |= Self::bit(family);
    }

    pub fn remove(&mut self, family: MethodFamily) {
        self.0 &= !Self::bit(family);
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Members in attachment order.
    pub fn iter(self) -> impl Iterator<Item = MethodFamily> {
        FAMILIES.into_iter().filter(move |f| self.contains(*f))
    }
}

impl FromIterator<MethodFamily> for FamilySet {
    fn from_iter<T: IntoIterator<Item = MethodFamily>>(iter: T) -> Self {
        let mut set = FamilySet::EMPTY;
        for family in iter {
            set.insert(family);
        }
        set
    }
}

/// Decoration settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthConfig {
    /// Families to synthesize
    pub families: FamilySet,
    /// Whether to set `__match_args__`
    pub emit_match_args: bool,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            families: FamilySet::defaults(),
            emit_match_args: true,
        }
    }
}

impl SynthConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also synthesize `__iter__`
    pub fn with_iter(self) -> Self {
        self.with_family(MethodFamily::Iter, true)
    }

    /// Also synthesize `__hash__`
    pub fn with_hash(self) -> Self {
        self.with_family(MethodFamily::Hash, true)
    }

    pub fn with_family(mut self, family: MethodFamily, enabled: bool) -> Self {
        if enabled {
            self.families.insert(family);
        } else {
            self.families.remove(family);
        }
        self
    }

    pub fn with_match_args(mut self, emit: bool) -> Self {
        self.emit_match_args = emit;
        self
    }

    pub fn is_enabled(&self, family: MethodFamily) -> bool {
        self.families.contains(family)
    }
}
