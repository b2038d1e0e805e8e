//! Runtime values.
//!
//! Values are cheap to clone: compound values are reference counted and identity (`is`) is
//! pointer identity for them.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use dataklass_core::lang::builtins::{self, BuiltinId};

use super::class::{Class, Method};
use super::instance::Instance;
use super::vm::Frame;
use crate::codegen::Symbol;

/// A dynamically typed runtime value.
#[derive(Clone)]
pub enum Value {
    None,
    NotImplemented,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    Tuple(Rc<[Value]>),
    Instance(Rc<Instance>),
    Class(Rc<Class>),
    /// The type of a non-instance value, as returned by `type(...)`.
    BuiltinType(&'static str),
    Builtin(BuiltinId),
    /// A method looked up on a class, not bound to a receiver.
    Method(Method),
    BoundMethod(Rc<BoundMethod>),
    Generator(Rc<RefCell<Frame>>),
}

/// A method paired with the receiver it was looked up on.
pub struct BoundMethod {
    pub receiver: Value,
    pub name: Symbol,
    pub method: Method,
}

impl Value {
    pub fn str(s: &str) -> Value {
        Value::Str(Rc::from(s))
    }

    pub fn tuple(items: impl IntoIterator<Item = Value>) -> Value {
        Value::Tuple(items.into_iter().collect())
    }

    /// Name of the value's type, as used in error messages.
    pub fn type_name(&self) -> String {
        match self {
            Value::None => "NoneType".to_string(),
            Value::NotImplemented => "NotImplementedType".to_string(),
            Value::Bool(_) => "bool".to_string(),
            Value::Int(_) => "int".to_string(),
            Value::Float(_) => "float".to_string(),
            Value::Str(_) => "str".to_string(),
            Value::Tuple(_) => "tuple".to_string(),
            Value::Instance(inst) => inst.class().name().to_string(),
            Value::Class(_) | Value::BuiltinType(_) => "type".to_string(),
            Value::Builtin(_) => "builtin_function_or_method".to_string(),
            Value::Method(_) => "function".to_string(),
            Value::BoundMethod(_) => "method".to_string(),
            Value::Generator(_) => "generator".to_string(),
        }
    }

    /// Python-like truthiness.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(v) => *v != 0,
            Value::Float(v) => *v != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Tuple(items) => !items.is_empty(),
            _ => true,
        }
    }

    /// Identity comparison (`is`).
    pub fn is(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::None, Value::None) | (Value::NotImplemented, Value::NotImplemented) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => Rc::ptr_eq(a, b),
            (Value::Tuple(a), Value::Tuple(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::BuiltinType(a), Value::BuiltinType(b)) => a == b,
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            (Value::Method(a), Value::Method(b)) => a.ptr_eq(b),
            (Value::BoundMethod(a), Value::BoundMethod(b)) => Rc::ptr_eq(a, b),
            (Value::Generator(a), Value::Generator(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Rc<Instance>> {
        match self {
            Value::Instance(inst) => Some(inst),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::str(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Tuple(items.into())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => f.write_str("None"),
            Value::NotImplemented => f.write_str("NotImplemented"),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Int(v) => write!(f, "Int({})", v),
            Value::Float(v) => write!(f, "Float({:?})", v),
            Value::Str(s) => write!(f, "Str({:?})", s),
            Value::Tuple(items) => f.debug_tuple("Tuple").field(&items.as_ref()).finish(),
            Value::Instance(inst) => {
                let mut s = f.debug_struct(inst.class().name());
                for (name, value) in inst.attrs() {
                    s.field(&name, &value);
                }
                s.finish()
            }
            Value::Class(class) => write!(f, "Class({})", class.name()),
            Value::BuiltinType(name) => write!(f, "BuiltinType({})", name),
            Value::Builtin(id) => write!(f, "Builtin({})", builtins::as_str(*id)),
            Value::Method(_) => f.write_str("Method"),
            Value::BoundMethod(bound) => write!(f, "BoundMethod({})", bound.name),
            Value::Generator(_) => f.write_str("Generator"),
        }
    }
}
