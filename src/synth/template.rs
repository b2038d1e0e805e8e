//! Generic templates: a family's code compiled once for an arity.

use dataklass_core::MethodFamily;

use super::errors::SynthError;
use crate::codegen::{CodeObject, Symbol, compile, generate, placeholder_index};

/// Where the placeholders sit in a template's name tables.
///
/// Each entry is `(slot, field_index)`: table position `slot` holds `_{field_index}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderSlots {
    pub names: Vec<(usize, usize)>,
    pub varnames: Vec<(usize, usize)>,
}

impl PlaceholderSlots {
    fn scan_table(table: &[Symbol], arity: usize) -> Vec<(usize, usize)> {
        table
            .iter()
            .enumerate()
            .filter_map(|(slot, name)| placeholder_index(name).filter(|&i| i < arity).map(|i| (slot, i)))
            .collect()
    }

    pub fn scan(code: &CodeObject, arity: usize) -> Self {
        Self {
            names: Self::scan_table(&code.names, arity),
            varnames: Self::scan_table(&code.varnames, arity),
        }
    }
}

/// A compiled, not yet specialized method.
#[derive(Debug)]
pub struct Template {
    family: MethodFamily,
    arity: usize,
    source: String,
    code: CodeObject,
    slots: PlaceholderSlots,
}

impl Template {
    /// Generate and compile the template for `family` at `arity`.
    pub fn build(family: MethodFamily, arity: usize) -> Result<Self, SynthError> {
        let source = generate(family, arity);
        let code = compile(&source).map_err(|source| SynthError::TemplateCompile { family, arity, source })?;
        let slots = PlaceholderSlots::scan(&code, arity);
        Ok(Self {
            family,
            arity,
            source,
            code,
            slots,
        })
    }

    pub fn family(&self) -> MethodFamily {
        self.family
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Generated source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn code(&self) -> &CodeObject {
        &self.code
    }

    pub fn slots(&self) -> &PlaceholderSlots {
        &self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dataklass_core::FAMILIES;

    #[test]
    fn every_family_compiles_at_small_arities() {
        for family in FAMILIES {
            for arity in 0..6 {
                let template = Template::build(family, arity).unwrap();
                assert_eq!(template.code().is_generator, family == MethodFamily::Iter);
            }
        }
    }

    #[test]
    fn init_slots_cover_names_and_varnames() {
        let template = Template::build(MethodFamily::Init, 2).unwrap();
        assert_eq!(template.slots().names, vec![(0, 0), (1, 1)]);
        assert_eq!(template.slots().varnames, vec![(1, 0), (2, 1)]);
        assert_eq!(template.code().argcount, 3);
    }

    #[test]
    fn globals_are_not_slots() {
        let template = Template::build(MethodFamily::Eq, 2).unwrap();
        let names: Vec<&str> = template.code().names.iter().map(|s| &**s).collect();
        assert_eq!(names, vec!["__class__", "_0", "_1", "NotImplemented"]);
        assert_eq!(template.slots().names, vec![(1, 0), (2, 1)]);
        assert!(template.slots().varnames.is_empty());
    }

    #[test]
    fn repr_slots_skip_type_and_name() {
        let template = Template::build(MethodFamily::Repr, 1).unwrap();
        let names: Vec<&str> = template.code().names.iter().map(|s| &**s).collect();
        assert_eq!(names, vec!["type", "__name__", "_0"]);
        assert_eq!(template.slots().names, vec![(2, 0)]);
    }
}
