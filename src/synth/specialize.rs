//! Specialization: put real field names into a template's name tables.
//!
//! No source is generated and nothing is compiled here. The specialized code object shares its
//! instruction stream and constant pool with the template.

use std::sync::Arc;

use super::fields::FieldList;
use super::template::Template;
use crate::codegen::Symbol;
use crate::runtime::{Function, Origin};

fn patch(table: &Arc<[Symbol]>, slots: &[(usize, usize)], fields: &FieldList) -> Arc<[Symbol]> {
    if slots.is_empty() {
        return Arc::clone(table);
    }
    let mut patched = table.to_vec();
    for &(slot, field) in slots {
        patched[slot] = Symbol::clone(&fields.names()[field]);
    }
    patched.into()
}

/// Bind `template` to `fields`.
///
/// ## Panics
///
/// - If `fields.arity()` differs from the template's arity. The cache is keyed by arity, so this
///   only happens if a caller pairs a template with the wrong field list.
pub fn specialize(template: &Template, fields: &FieldList) -> Function {
    assert_eq!(
        fields.arity(),
        template.arity(),
        "INVARIANT: {} template of arity {} specialized with {} fields",
        template.family(),
        template.arity(),
        fields.arity()
    );

    let code = template.code();
    let slots = template.slots();
    let names = patch(&code.names, &slots.names, fields);
    let varnames = patch(&code.varnames, &slots.varnames, fields);

    Function {
        code: code.replace_names(names, varnames),
        origin: Origin::Synthesized(template.family()),
    }
}
