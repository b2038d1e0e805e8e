//! Instances of runtime classes.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use super::class::Class;
use super::value::Value;
use crate::codegen::Symbol;

/// An object with a class and an ordered attribute dictionary.
pub struct Instance {
    class: Rc<Class>,
    attrs: RefCell<IndexMap<Symbol, Value>>,
}

impl Instance {
    pub fn new(class: Rc<Class>) -> Self {
        Self {
            class,
            attrs: RefCell::new(IndexMap::new()),
        }
    }

    pub fn class(&self) -> &Rc<Class> {
        &self.class
    }

    /// Own attribute, without class lookup.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.attrs.borrow().get(name).cloned()
    }

    pub fn set(&self, name: &str, value: Value) {
        let mut attrs = self.attrs.borrow_mut();
        match attrs.get_mut(name) {
            Some(slot) => *slot = value,
            None => {
                attrs.insert(Symbol::from(name), value);
            }
        }
    }

    /// Snapshot of the attributes in insertion order.
    pub fn attrs(&self) -> Vec<(Symbol, Value)> {
        self.attrs
            .borrow()
            .iter()
            .map(|(k, v)| (Symbol::clone(k), v.clone()))
            .collect()
    }
}
