//! Field resolution.
//!
//! Fields are the annotations declared along the method resolution order. Bases come first and
//! fix each field's position; a subclass redeclaring a field replaces its hint but keeps the slot.

use std::rc::Rc;
use std::sync::Arc;

use indexmap::IndexMap;

use dataklass_core::lang::magic_methods;

use super::errors::SynthError;
use crate::codegen::Symbol;
use crate::runtime::{Class, Value};
use crate::template::lexer::is_identifier;

/// Hint recorded for fields declared without one.
const ANY_HINT: &str = "object";

/// Ordered, duplicate-free field names of a record class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldList {
    names: Arc<[Symbol]>,
    hints: Arc<[Symbol]>,
}

impl FieldList {
    pub fn empty() -> Self {
        Self {
            names: Arc::from(Vec::new()),
            hints: Arc::from(Vec::new()),
        }
    }

    /// Build a field list from bare names, validating each one.
    pub fn try_from_names<I, S>(names: I) -> Result<Self, SynthError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut merged: IndexMap<Symbol, Symbol> = IndexMap::new();
        for name in names {
            let name = name.as_ref();
            check_field_name(name).map_err(|reason| malformed("<fields>", name, reason))?;
            if merged.insert(Symbol::from(name), Symbol::from(ANY_HINT)).is_some() {
                return Err(malformed("<fields>", name, "declared more than once"));
            }
        }
        Ok(Self::from_map(merged))
    }

    fn from_map(map: IndexMap<Symbol, Symbol>) -> Self {
        let (names, hints): (Vec<Symbol>, Vec<Symbol>) = map.into_iter().unzip();
        Self {
            names: names.into(),
            hints: hints.into(),
        }
    }

    pub fn arity(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[Symbol] {
        &self.names
    }

    pub fn hints(&self) -> &[Symbol] {
        &self.hints
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|s| &**s)
    }

    /// The names as a tuple of strings, the value of `__match_args__`.
    pub fn to_tuple(&self) -> Value {
        Value::tuple(self.names.iter().map(|name| Value::str(name)))
    }
}

fn malformed(class: &str, field: &str, reason: &str) -> SynthError {
    SynthError::MalformedField {
        class: class.to_string(),
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

/// Reject names that cannot be both a parameter and an attribute.
pub fn check_field_name(name: &str) -> Result<(), &'static str> {
    if name == "self" {
        return Err("'self' is reserved for the receiver");
    }
    if !is_identifier(name) {
        return Err("not a valid identifier");
    }
    if magic_methods::is_dunder(name) {
        return Err("dunder names are reserved");
    }
    Ok(())
}

/// Collect the fields of `class` along its method resolution order, most-base first.
pub fn resolve_fields(class: &Rc<Class>) -> Result<FieldList, SynthError> {
    let mut merged: IndexMap<Symbol, Symbol> = IndexMap::new();
    for level in class.mro().iter().rev() {
        for (name, hint) in level.annotations() {
            check_field_name(name).map_err(|reason| malformed(level.name(), name, reason))?;
            merged.insert(Symbol::clone(name), Symbol::clone(hint));
        }
    }
    Ok(FieldList::from_map(merged))
}
