//! Runtime classes and their construction.
//!
//! A [`Class`] carries its own field annotations, a C3 method resolution order computed once
//! at build time, and a mutable member dictionary. Synthesized methods are attached to that
//! dictionary after the class is built; user methods are attached by [`ClassBuilder`].

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use thiserror::Error;

use dataklass_core::MethodFamily;
use dataklass_core::lang::magic_methods::{self, MagicMethodId};

use super::errors::RuntimeError;
use super::instance::Instance;
use super::mro;
use super::value::Value;
use super::vm;
use crate::codegen::{CodeObject, Symbol, compile};
use crate::template::TemplateError;

/// Where a compiled method came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Written by the class author (`ClassBuilder::method_source`).
    User,
    /// Specialized from a cached template.
    Synthesized(MethodFamily),
}

/// A compiled method.
#[derive(Debug)]
pub struct Function {
    pub code: CodeObject,
    pub origin: Origin,
}

/// Signature of a method implemented in Rust. `args[0]` is the receiver.
pub type NativeFn = Rc<dyn Fn(&[Value]) -> Result<Value, RuntimeError>>;

/// A callable class member.
#[derive(Clone)]
pub enum Method {
    Code(Rc<Function>),
    Native(NativeFn),
}

impl Method {
    pub fn ptr_eq(&self, other: &Method) -> bool {
        match (self, other) {
            (Method::Code(a), Method::Code(b)) => Rc::ptr_eq(a, b),
            (Method::Native(a), Method::Native(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// The compiled function, if this is not a native method.
    pub fn function(&self) -> Option<&Rc<Function>> {
        match self {
            Method::Code(func) => Some(func),
            Method::Native(_) => None,
        }
    }

    pub fn origin(&self) -> Origin {
        match self {
            Method::Code(func) => func.origin,
            Method::Native(_) => Origin::User,
        }
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Code(func) => write!(f, "Method::Code({}, {:?})", func.code.name, func.origin),
            Method::Native(_) => f.write_str("Method::Native"),
        }
    }
}

/// An entry of a class dictionary.
#[derive(Clone, Debug)]
pub enum ClassAttr {
    Method(Method),
    Value(Value),
}

/// A runtime class.
pub struct Class {
    name: Symbol,
    bases: Vec<Rc<Class>>,
    /// Ancestors in C3 order, excluding the class itself.
    ancestors: Vec<Rc<Class>>,
    /// Own field declarations: name to type hint.
    annotations: IndexMap<Symbol, Symbol>,
    dict: RefCell<IndexMap<Symbol, ClassAttr>>,
}

impl Class {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bases(&self) -> &[Rc<Class>] {
        &self.bases
    }

    /// Own field annotations in declaration order.
    pub fn annotations(&self) -> &IndexMap<Symbol, Symbol> {
        &self.annotations
    }

    /// Method resolution order, starting with the class itself.
    pub fn mro(self: &Rc<Self>) -> Vec<Rc<Class>> {
        let mut order = Vec::with_capacity(self.ancestors.len() + 1);
        order.push(Rc::clone(self));
        order.extend(self.ancestors.iter().cloned());
        order
    }

    /// True if `name` is defined in this class's own dictionary.
    pub fn defines(&self, name: &str) -> bool {
        self.dict.borrow().contains_key(name)
    }

    /// Own dictionary entry, without inheritance.
    pub fn own(&self, name: &str) -> Option<ClassAttr> {
        self.dict.borrow().get(name).cloned()
    }

    /// Member lookup along the method resolution order.
    pub fn lookup(&self, name: &str) -> Option<ClassAttr> {
        self.own(name)
            .or_else(|| self.ancestors.iter().find_map(|class| class.own(name)))
    }

    /// Names in the own dictionary, in insertion order.
    pub fn member_names(&self) -> Vec<Symbol> {
        self.dict.borrow().keys().cloned().collect()
    }

    pub fn set_attr(&self, name: &str, attr: ClassAttr) {
        self.dict.borrow_mut().insert(Symbol::from(name), attr);
    }

    /// Insert several members under one dictionary borrow.
    pub fn set_attrs(&self, attrs: impl IntoIterator<Item = (Symbol, ClassAttr)>) {
        self.dict.borrow_mut().extend(attrs);
    }

    pub fn is_subclass_of(self: &Rc<Self>, other: &Rc<Class>) -> bool {
        Rc::ptr_eq(self, other) || self.ancestors.iter().any(|c| Rc::ptr_eq(c, other))
    }

    /// Construct an instance from positional arguments.
    pub fn call(self: &Rc<Self>, args: Vec<Value>) -> Result<Value, RuntimeError> {
        self.call_with_keywords(args, &[])
    }

    /// Construct an instance; keyword arguments bind by constructor parameter name.
    ///
    /// ## Errors
    ///
    /// - `TypeError` if arguments do not bind, if `__init__` returns something other than
    ///   `None`, or if arguments are passed to a class without `__init__`.
    pub fn call_with_keywords(self: &Rc<Self>, args: Vec<Value>, kwargs: &[(&str, Value)]) -> Result<Value, RuntimeError> {
        let instance = Value::Instance(Rc::new(Instance::new(Rc::clone(self))));
        let init = magic_methods::as_str(MagicMethodId::Init);

        match self.lookup(init) {
            Some(ClassAttr::Method(method)) => {
                let mut bound = Vec::with_capacity(args.len() + 1);
                bound.push(instance.clone());
                bound.extend(args);
                let result = vm::call_method(&method, bound, kwargs)?;
                if !matches!(result, Value::None) {
                    return Err(RuntimeError::type_error(format!(
                        "__init__() should return None, not '{}'",
                        result.type_name()
                    )));
                }
            }
            Some(ClassAttr::Value(value)) => {
                return Err(RuntimeError::type_error(format!(
                    "'{}' object is not callable",
                    value.type_name()
                )));
            }
            None if !args.is_empty() || !kwargs.is_empty() => {
                return Err(RuntimeError::type_error(format!("{}() takes no arguments", self.name)));
            }
            None => {}
        }
        Ok(instance)
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name)
            .field("fields", &self.annotations.keys().collect::<Vec<_>>())
            .field("members", &self.dict.borrow().keys().collect::<Vec<_>>())
            .finish()
    }
}

// ============================================================================
// Class construction
// ============================================================================

/// Errors detected while building a class.
#[derive(Debug, Error)]
pub enum ClassError {
    #[error("duplicate field '{field}' in class '{class}'")]
    DuplicateField { class: String, field: String },
    #[error("duplicate member '{member}' in class '{class}'")]
    DuplicateMember { class: String, member: String },
    #[error("duplicate base class '{base}' in class '{class}'")]
    DuplicateBase { class: String, base: String },
    #[error("cannot create a consistent method resolution order for class '{class}'")]
    InconsistentMro { class: String },
    #[error("method '{method}' of class '{class}' does not compile: {source}")]
    MethodSource {
        class: String,
        method: String,
        source: TemplateError,
    },
}

enum Member {
    Native(NativeFn),
    Source(String),
    Value(Value),
}

/// Builder for [`Class`].
///
/// ## Examples
///
/// ```rust
/// use dataklass::runtime::{ClassBuilder, Value};
///
/// let point = ClassBuilder::new("Point")
///     .field("x", "int")
///     .field("y", "int")
///     .build()
///     .unwrap();
/// assert_eq!(point.annotations().len(), 2);
/// assert!(point.call(vec![Value::Int(1)]).is_err());
/// ```
pub struct ClassBuilder {
    name: String,
    bases: Vec<Rc<Class>>,
    fields: Vec<(String, String)>,
    members: Vec<(String, Member)>,
}

impl ClassBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bases: Vec::new(),
            fields: Vec::new(),
            members: Vec::new(),
        }
    }

    pub fn base(mut self, base: &Rc<Class>) -> Self {
        self.bases.push(Rc::clone(base));
        self
    }

    /// Declare a field with a type hint. Hints are recorded, never checked.
    pub fn field(mut self, name: impl Into<String>, hint: impl Into<String>) -> Self {
        self.fields.push((name.into(), hint.into()));
        self
    }

    pub fn method_native(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&[Value]) -> Result<Value, RuntimeError> + 'static,
    ) -> Self {
        self.members.push((name.into(), Member::Native(Rc::new(f))));
        self
    }

    /// A method written in the template language, compiled when the class is built.
    pub fn method_source(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.members.push((name.into(), Member::Source(source.into())));
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: Value) -> Self {
        self.members.push((name.into(), Member::Value(value)));
        self
    }

    pub fn build(self) -> Result<Rc<Class>, ClassError> {
        let class_name = self.name;

        for (i, base) in self.bases.iter().enumerate() {
            if self.bases[..i].iter().any(|b| Rc::ptr_eq(b, base)) {
                return Err(ClassError::DuplicateBase {
                    class: class_name,
                    base: base.name().to_string(),
                });
            }
        }

        let mut annotations: IndexMap<Symbol, Symbol> = IndexMap::new();
        for (field, hint) in self.fields {
            if annotations.contains_key(field.as_str()) {
                return Err(ClassError::DuplicateField { class: class_name, field });
            }
            annotations.insert(Symbol::from(field), Symbol::from(hint));
        }

        let mut dict: IndexMap<Symbol, ClassAttr> = IndexMap::new();
        for (member, body) in self.members {
            if dict.contains_key(member.as_str()) {
                return Err(ClassError::DuplicateMember {
                    class: class_name,
                    member,
                });
            }
            let attr = match body {
                Member::Native(f) => ClassAttr::Method(Method::Native(f)),
                Member::Value(v) => ClassAttr::Value(v),
                Member::Source(source) => match compile(&source) {
                    Ok(code) => ClassAttr::Method(Method::Code(Rc::new(Function {
                        code,
                        origin: Origin::User,
                    }))),
                    Err(source) => {
                        return Err(ClassError::MethodSource {
                            class: class_name,
                            method: member,
                            source,
                        });
                    }
                },
            };
            dict.insert(Symbol::from(member), attr);
        }

        let Some(ancestors) = mro::linearize(&self.bases) else {
            return Err(ClassError::InconsistentMro { class: class_name });
        };

        tracing::trace!(class = %class_name, fields = annotations.len(), "built class");

        Ok(Rc::new(Class {
            name: Symbol::from(class_name),
            bases: self.bases,
            ancestors,
            annotations,
            dict: RefCell::new(dict),
        }))
    }
}
