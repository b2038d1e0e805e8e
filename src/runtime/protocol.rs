//! Object protocols: attribute access, equality, representation, hashing, iteration, and
//! positional matching.
//!
//! These are the entry points through which synthesized methods are observed. Each one consults
//! the class member of the matching dunder and falls back to a default when none exists.

use std::cell::RefCell;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use rustc_hash::{FxHashSet, FxHasher};

use dataklass_core::lang::builtins::{self, BuiltinId};
use dataklass_core::lang::magic_methods::{self, MagicMethodId};

use super::class::{Class, ClassAttr, Method};
use super::errors::RuntimeError;
use super::value::{BoundMethod, Value};
use super::vm::{self, Frame, Step};
use crate::codegen::Symbol;

fn dunder(id: MagicMethodId) -> &'static str {
    magic_methods::as_str(id)
}

/// Call the dunder `id` found on the class of `receiver`, if any.
fn call_dunder(receiver: &Value, class: &Class, id: MagicMethodId, args: Vec<Value>) -> Result<Option<Value>, RuntimeError> {
    let Some(attr) = class.lookup(dunder(id)) else {
        return Ok(None);
    };
    let mut full = Vec::with_capacity(args.len() + 1);
    full.push(receiver.clone());
    full.extend(args);
    match attr {
        ClassAttr::Method(method) => vm::call_method(&method, full, &[]).map(Some),
        ClassAttr::Value(Value::None) => Ok(None),
        ClassAttr::Value(other) => vm::call_value(&other, full).map(Some),
    }
}

// ============================================================================
// Attributes
// ============================================================================

/// The runtime class of a value, as `type(v)` returns it.
pub fn type_of(value: &Value) -> Value {
    match value {
        Value::Instance(inst) => Value::Class(Rc::clone(inst.class())),
        Value::None => Value::BuiltinType("NoneType"),
        Value::NotImplemented => Value::BuiltinType("NotImplementedType"),
        Value::Bool(_) => Value::BuiltinType("bool"),
        Value::Int(_) => Value::BuiltinType("int"),
        Value::Float(_) => Value::BuiltinType("float"),
        Value::Str(_) => Value::BuiltinType("str"),
        Value::Tuple(_) => Value::BuiltinType("tuple"),
        Value::Class(_) | Value::BuiltinType(_) => Value::BuiltinType("type"),
        Value::Builtin(_) => Value::BuiltinType("builtin_function_or_method"),
        Value::Method(_) => Value::BuiltinType("function"),
        Value::BoundMethod(_) => Value::BuiltinType("method"),
        Value::Generator(_) => Value::BuiltinType("generator"),
    }
}

/// `obj.name`.
///
/// Instances resolve `__class__`, then their own attributes, then class members (methods come
/// back bound). Classes answer `__name__` and their members.
pub fn get_attr(obj: &Value, name: &str) -> Result<Value, RuntimeError> {
    if name == dunder(MagicMethodId::Class) {
        return Ok(type_of(obj));
    }
    match obj {
        Value::Instance(inst) => {
            if let Some(value) = inst.get(name) {
                return Ok(value);
            }
            match inst.class().lookup(name) {
                Some(ClassAttr::Method(method)) => Ok(Value::BoundMethod(Rc::new(BoundMethod {
                    receiver: obj.clone(),
                    name: Symbol::from(name),
                    method,
                }))),
                Some(ClassAttr::Value(value)) => Ok(value),
                None => Err(RuntimeError::no_attribute(inst.class().name(), name)),
            }
        }
        Value::Class(class) => {
            if name == dunder(MagicMethodId::Name) {
                return Ok(Value::str(class.name()));
            }
            match class.lookup(name) {
                Some(ClassAttr::Method(method)) => Ok(Value::Method(method)),
                Some(ClassAttr::Value(value)) => Ok(value),
                None => Err(RuntimeError::Attribute(format!(
                    "type object '{}' has no attribute '{}'",
                    class.name(),
                    name
                ))),
            }
        }
        Value::BuiltinType(type_name) if name == dunder(MagicMethodId::Name) => Ok(Value::str(type_name)),
        other => Err(RuntimeError::no_attribute(&other.type_name(), name)),
    }
}

/// `obj.name = value`. Only instances carry writable attributes.
pub fn set_attr(obj: &Value, name: &str, value: Value) -> Result<(), RuntimeError> {
    match obj {
        Value::Instance(inst) => {
            inst.set(name, value);
            Ok(())
        }
        other => Err(RuntimeError::no_attribute(&other.type_name(), name)),
    }
}

// ============================================================================
// Equality
// ============================================================================

/// Three-way outcome of one side of an equality comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EqOutcome {
    Equal,
    NotEqual,
    /// The left operand does not know how to compare itself with the right one.
    NotComparable,
}

impl From<bool> for EqOutcome {
    fn from(equal: bool) -> Self {
        if equal { EqOutcome::Equal } else { EqOutcome::NotEqual }
    }
}

/// A numeric value, kept in its own kind so mixed comparisons stay exact.
#[derive(Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

fn as_number(value: &Value) -> Option<Number> {
    match value {
        Value::Bool(b) => Some(Number::Int(*b as i64)),
        Value::Int(v) => Some(Number::Int(*v)),
        Value::Float(v) => Some(Number::Float(*v)),
        _ => None,
    }
}

/// Bounds of the floats that convert to `i64` without saturating: `[-2^63, 2^63)`.
const I64_FLOAT_MIN: f64 = -9_223_372_036_854_775_808.0;
const I64_FLOAT_END: f64 = 9_223_372_036_854_775_808.0;

/// The integer a float is exactly equal to, if any.
fn exact_int(v: f64) -> Option<i64> {
    (v.fract() == 0.0 && (I64_FLOAT_MIN..I64_FLOAT_END).contains(&v)).then(|| v as i64)
}

fn numbers_equal(lhs: Number, rhs: Number) -> bool {
    match (lhs, rhs) {
        (Number::Int(a), Number::Int(b)) => a == b,
        (Number::Float(a), Number::Float(b)) => a == b,
        (Number::Int(i), Number::Float(f)) | (Number::Float(f), Number::Int(i)) => exact_int(f) == Some(i),
    }
}

/// Ask the left operand whether it equals the right one.
pub fn rich_eq(lhs: &Value, rhs: &Value) -> Result<EqOutcome, RuntimeError> {
    let outcome = match (lhs, rhs) {
        (Value::Instance(inst), _) => match call_dunder(lhs, inst.class(), MagicMethodId::Eq, vec![rhs.clone()])? {
            None | Some(Value::NotImplemented) => EqOutcome::NotComparable,
            Some(result) => result.is_truthy().into(),
        },
        (Value::None, Value::None) | (Value::NotImplemented, Value::NotImplemented) => EqOutcome::Equal,
        (Value::Str(a), Value::Str(b)) => (a == b).into(),
        (Value::Int(a), Value::Int(b)) => (a == b).into(),
        (Value::Bool(a), Value::Bool(b)) => (a == b).into(),
        (Value::Int(_) | Value::Bool(_) | Value::Float(_), Value::Int(_) | Value::Bool(_) | Value::Float(_)) => {
            match (as_number(lhs), as_number(rhs)) {
                (Some(a), Some(b)) => numbers_equal(a, b).into(),
                _ => EqOutcome::NotComparable,
            }
        }
        (Value::Tuple(a), Value::Tuple(b)) => {
            if Rc::ptr_eq(a, b) {
                EqOutcome::Equal
            } else if a.len() != b.len() {
                EqOutcome::NotEqual
            } else {
                let mut outcome = EqOutcome::Equal;
                for (x, y) in a.iter().zip(b.iter()) {
                    if !x.is(y) && !equals(x, y)? {
                        outcome = EqOutcome::NotEqual;
                        break;
                    }
                }
                outcome
            }
        }
        (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b).into(),
        (Value::BuiltinType(a), Value::BuiltinType(b)) => (a == b).into(),
        (Value::Builtin(a), Value::Builtin(b)) => (a == b).into(),
        _ => EqOutcome::NotComparable,
    };
    Ok(outcome)
}

/// `lhs == rhs`: forward comparison, then the reflected one, then identity.
pub fn equals(lhs: &Value, rhs: &Value) -> Result<bool, RuntimeError> {
    match rich_eq(lhs, rhs)? {
        EqOutcome::Equal => return Ok(true),
        EqOutcome::NotEqual => return Ok(false),
        EqOutcome::NotComparable => {}
    }
    match rich_eq(rhs, lhs)? {
        EqOutcome::Equal => Ok(true),
        EqOutcome::NotEqual => Ok(false),
        EqOutcome::NotComparable => Ok(lhs.is(rhs)),
    }
}

// ============================================================================
// Representation
// ============================================================================

fn repr_str(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

fn repr_float(v: f64) -> String {
    if v.is_nan() {
        "nan".to_string()
    } else if v.is_infinite() {
        if v > 0.0 { "inf".to_string() } else { "-inf".to_string() }
    } else {
        format!("{:?}", v)
    }
}

thread_local! {
    /// Instances whose `__repr__` is running on this thread.
    static REPR_ACTIVE: RefCell<FxHashSet<usize>> = RefCell::new(FxHashSet::default());
}

/// Marks one instance as being represented; unmarks it when dropped.
struct ReprGuard(usize);

impl ReprGuard {
    /// `None` when `key` is already being represented further up the stack.
    fn enter(key: usize) -> Option<Self> {
        REPR_ACTIVE.with(|active| active.borrow_mut().insert(key)).then(|| ReprGuard(key))
    }
}

impl Drop for ReprGuard {
    fn drop(&mut self) {
        REPR_ACTIVE.with(|active| active.borrow_mut().remove(&self.0));
    }
}

/// `repr(value)`.
///
/// An instance reached again while its own representation is being built renders as `...`.
pub fn repr(value: &Value) -> Result<String, RuntimeError> {
    let text = match value {
        Value::None => "None".to_string(),
        Value::NotImplemented => "NotImplemented".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Int(v) => v.to_string(),
        Value::Float(v) => repr_float(*v),
        Value::Str(s) => repr_str(s),
        Value::Tuple(items) => {
            let parts = items.iter().map(repr).collect::<Result<Vec<_>, _>>()?;
            match parts.as_slice() {
                [only] => format!("({},)", only),
                _ => format!("({})", parts.join(", ")),
            }
        }
        Value::Instance(inst) => {
            let Some(_active) = ReprGuard::enter(Rc::as_ptr(inst) as *const () as usize) else {
                return Ok("...".to_string());
            };
            match call_dunder(value, inst.class(), MagicMethodId::Repr, vec![])? {
                Some(Value::Str(s)) => s.to_string(),
                Some(other) => {
                    return Err(RuntimeError::type_error(format!(
                        "__repr__ returned non-string (type {})",
                        other.type_name()
                    )));
                }
                None => format!("<{} object>", inst.class().name()),
            }
        }
        Value::Class(class) => format!("<class '{}'>", class.name()),
        Value::BuiltinType(name) => format!("<class '{}'>", name),
        Value::Builtin(id) => format!("<built-in function {}>", builtins::as_str(*id)),
        Value::Method(_) => "<function>".to_string(),
        Value::BoundMethod(bound) => format!("<bound method {} of {}>", bound.name, repr(&bound.receiver)?),
        Value::Generator(frame) => match frame.try_borrow() {
            Ok(frame) => format!("<generator object {}>", frame.function().code.name),
            Err(_) => "<generator object>".to_string(),
        },
    };
    Ok(text)
}

/// `str(value)`: strings render as themselves, everything else as its repr.
pub fn str(value: &Value) -> Result<String, RuntimeError> {
    match value {
        Value::Str(s) => Ok(s.to_string()),
        other => repr(other),
    }
}

// ============================================================================
// Hashing
// ============================================================================

fn fx_hash(value: impl Hash) -> i64 {
    let mut hasher = FxHasher::default();
    value.hash(&mut hasher);
    hasher.finish() as i64
}

fn identity_hash<T: ?Sized>(rc: &Rc<T>) -> i64 {
    fx_hash(Rc::as_ptr(rc) as *const () as usize)
}

/// `hash(value)`.
///
/// Numbers that compare equal hash equal. Instances use the first class along the resolution
/// order that defines `__eq__` or `__hash__`: a `__hash__` there is called, an `__eq__` alone
/// makes the instance unhashable. With neither, instances hash by identity.
pub fn hash(value: &Value) -> Result<i64, RuntimeError> {
    let h = match value {
        Value::None => fx_hash("None"),
        Value::NotImplemented => fx_hash("NotImplemented"),
        Value::Bool(b) => fx_hash(*b as i64),
        Value::Int(v) => fx_hash(*v),
        Value::Float(v) => match exact_int(*v) {
            Some(i) => fx_hash(i),
            None => fx_hash(v.to_bits()),
        },
        Value::Str(s) => fx_hash(&**s),
        Value::Tuple(items) => {
            let mut hasher = FxHasher::default();
            items.len().hash(&mut hasher);
            for item in items.iter() {
                hash(item)?.hash(&mut hasher);
            }
            hasher.finish() as i64
        }
        Value::Instance(inst) => {
            let eq = dunder(MagicMethodId::Eq);
            let hash_name = dunder(MagicMethodId::Hash);
            for class in inst.class().mro() {
                if let Some(attr) = class.own(hash_name) {
                    return match attr {
                        ClassAttr::Value(Value::None) => Err(RuntimeError::Unhashable(inst.class().name().to_string())),
                        ClassAttr::Method(method) => match vm::call_method(&method, vec![value.clone()], &[])? {
                            Value::Int(h) => Ok(h),
                            other => Err(RuntimeError::type_error(format!(
                                "__hash__ method should return an integer, not '{}'",
                                other.type_name()
                            ))),
                        },
                        ClassAttr::Value(other) => Err(RuntimeError::type_error(format!(
                            "'{}' object is not callable",
                            other.type_name()
                        ))),
                    };
                }
                if class.defines(eq) {
                    return Err(RuntimeError::Unhashable(inst.class().name().to_string()));
                }
            }
            identity_hash(inst)
        }
        Value::Class(class) => identity_hash(class),
        Value::BuiltinType(name) => fx_hash(*name),
        Value::Builtin(id) => fx_hash(builtins::as_str(*id)),
        Value::BoundMethod(bound) => identity_hash(bound),
        Value::Generator(frame) => identity_hash(frame),
        Value::Method(Method::Code(f)) => identity_hash(f),
        Value::Method(Method::Native(f)) => identity_hash(f),
    };
    Ok(h)
}

// ============================================================================
// Iteration
// ============================================================================

/// Iterator over the items of an iterable value.
pub enum ValueIter {
    Items { items: Rc<[Value]>, pos: usize },
    Generator(Rc<RefCell<Frame>>),
}

impl Iterator for ValueIter {
    type Item = Result<Value, RuntimeError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            ValueIter::Items { items, pos } => {
                let item = items.get(*pos)?.clone();
                *pos += 1;
                Some(Ok(item))
            }
            ValueIter::Generator(frame) => {
                let Ok(mut frame) = frame.try_borrow_mut() else {
                    return Some(Err(RuntimeError::type_error("generator already executing")));
                };
                if frame.is_finished() {
                    return None;
                }
                match frame.resume() {
                    Ok(Step::Yield(value)) => Some(Ok(value)),
                    Ok(Step::Return(_)) => None,
                    Err(err) => Some(Err(err)),
                }
            }
        }
    }
}

/// Start iterating `value`. Each call on an instance calls `__iter__` again, so iteration is
/// restartable.
pub fn iterate(value: &Value) -> Result<ValueIter, RuntimeError> {
    match value {
        Value::Tuple(items) => Ok(ValueIter::Items {
            items: Rc::clone(items),
            pos: 0,
        }),
        Value::Str(s) => Ok(ValueIter::Items {
            items: s.chars().map(|c| Value::str(c.encode_utf8(&mut [0; 4]))).collect(),
            pos: 0,
        }),
        Value::Generator(frame) => Ok(ValueIter::Generator(Rc::clone(frame))),
        Value::Instance(inst) => match call_dunder(value, inst.class(), MagicMethodId::Iter, vec![])? {
            Some(Value::Instance(_)) | None => Err(RuntimeError::type_error(format!(
                "'{}' object is not iterable",
                inst.class().name()
            ))),
            Some(iterable) => iterate(&iterable),
        },
        other => Err(RuntimeError::type_error(format!(
            "'{}' object is not iterable",
            other.type_name()
        ))),
    }
}

/// Drain `value` into a vector.
pub fn collect(value: &Value) -> Result<Vec<Value>, RuntimeError> {
    iterate(value)?.collect()
}

// ============================================================================
// Pattern matching
// ============================================================================

/// `isinstance(value, class)`.
pub fn is_instance(value: &Value, class: &Rc<Class>) -> bool {
    value.as_instance().is_some_and(|inst| inst.class().is_subclass_of(class))
}

/// Positional class pattern `class(p0, .., p{n-1})`.
///
/// Returns `Ok(None)` when `value` is not an instance of `class`, otherwise the first `n`
/// attributes named by `class.__match_args__`.
pub fn match_positional(value: &Value, class: &Rc<Class>, n: usize) -> Result<Option<Vec<Value>>, RuntimeError> {
    if !is_instance(value, class) {
        return Ok(None);
    }
    if n == 0 {
        return Ok(Some(Vec::new()));
    }
    let match_args = match class.lookup(dunder(MagicMethodId::MatchArgs)) {
        Some(ClassAttr::Value(Value::Tuple(items))) => items,
        Some(_) => {
            return Err(RuntimeError::type_error(format!(
                "{}.__match_args__ must be a tuple",
                class.name()
            )));
        }
        None => {
            return Err(RuntimeError::type_error(format!(
                "{}() accepts 0 positional sub-patterns ({} given)",
                class.name(),
                n
            )));
        }
    };
    if n > match_args.len() {
        return Err(RuntimeError::type_error(format!(
            "{}() accepts {} positional sub-pattern{} ({} given)",
            class.name(),
            match_args.len(),
            if match_args.len() == 1 { "" } else { "s" },
            n
        )));
    }
    match_args[..n]
        .iter()
        .map(|name| match name {
            Value::Str(name) => get_attr(value, name),
            other => Err(RuntimeError::type_error(format!(
                "__match_args__ elements must be strings (got {})",
                other.type_name()
            ))),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

// ============================================================================
// Builtins
// ============================================================================

/// Call a builtin global.
pub fn call_builtin(id: BuiltinId, args: &[Value]) -> Result<Value, RuntimeError> {
    let name = builtins::as_str(id);
    let [arg] = args else {
        if id == BuiltinId::NotImplemented {
            return Err(RuntimeError::type_error("'NotImplementedType' object is not callable"));
        }
        return Err(RuntimeError::type_error(format!(
            "{}() takes exactly one argument ({} given)",
            name,
            args.len()
        )));
    };
    match id {
        BuiltinId::Type => Ok(type_of(arg)),
        BuiltinId::Hash => hash(arg).map(Value::Int),
        BuiltinId::Repr => repr(arg).map(|s| Value::str(&s)),
        BuiltinId::NotImplemented => Err(RuntimeError::type_error("'NotImplementedType' object is not callable")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::ClassBuilder;

    #[test]
    fn repr_is_python_like() {
        let cases = [
            (Value::None, "None"),
            (Value::Bool(true), "True"),
            (Value::Float(2.0), "2.0"),
            (Value::Float(f64::INFINITY), "inf"),
            (Value::str("a'b"), "\"a'b\""),
            (Value::str("ab"), "'ab'"),
            (Value::tuple([Value::Int(1)]), "(1,)"),
            (Value::tuple([]), "()"),
            (Value::tuple([Value::Int(1), Value::str("x")]), "(1, 'x')"),
        ];
        for (value, expected) in cases {
            assert_eq!(repr(&value).unwrap(), expected);
        }
    }

    #[test]
    fn numbers_compare_across_kinds() {
        assert!(equals(&Value::Int(1), &Value::Float(1.0)).unwrap());
        assert!(equals(&Value::Bool(true), &Value::Int(1)).unwrap());
        assert_eq!(hash(&Value::Int(1)).unwrap(), hash(&Value::Float(1.0)).unwrap());
        assert_eq!(hash(&Value::Bool(true)).unwrap(), hash(&Value::Int(1)).unwrap());
    }

    #[test]
    fn int_float_equality_is_exact() {
        let big = Value::Int(9_007_199_254_740_993);
        let near = Value::Float(9_007_199_254_740_992.0);
        assert!(!equals(&big, &near).unwrap());
        assert!(!equals(&near, &big).unwrap());

        let exact = Value::Int(9_007_199_254_740_992);
        assert!(equals(&exact, &near).unwrap());
        assert_eq!(hash(&exact).unwrap(), hash(&near).unwrap());

        assert!(!equals(&Value::Int(i64::MAX), &Value::Float(9.223_372_036_854_775_808e18)).unwrap());
        assert!(!equals(&Value::Int(1), &Value::Float(1.5)).unwrap());
        assert!(!equals(&Value::Int(0), &Value::Float(f64::NAN)).unwrap());
        assert!(equals(&Value::Int(0), &Value::Float(-0.0)).unwrap());
        assert_eq!(hash(&Value::Int(0)).unwrap(), hash(&Value::Float(-0.0)).unwrap());
    }

    #[test]
    fn mismatched_kinds_are_not_comparable() {
        assert_eq!(rich_eq(&Value::Int(1), &Value::str("1")).unwrap(), EqOutcome::NotComparable);
        assert!(!equals(&Value::Int(1), &Value::str("1")).unwrap());
    }

    #[test]
    fn tuples_compare_elementwise() {
        let a = Value::tuple([Value::Int(1), Value::str("x")]);
        let b = Value::tuple([Value::Int(1), Value::str("x")]);
        let c = Value::tuple([Value::Int(1)]);
        assert!(equals(&a, &b).unwrap());
        assert!(!equals(&a, &c).unwrap());
        assert_eq!(hash(&a).unwrap(), hash(&b).unwrap());
    }

    #[test]
    fn plain_instances_use_identity() {
        let class = ClassBuilder::new("Plain").build().unwrap();
        let a = class.call(vec![]).unwrap();
        let b = class.call(vec![]).unwrap();
        assert!(equals(&a, &a).unwrap());
        assert!(!equals(&a, &b).unwrap());
        assert_eq!(hash(&a).unwrap(), hash(&a.clone()).unwrap());
        assert_eq!(repr(&a).unwrap(), "<Plain object>");
    }

    #[test]
    fn eq_without_hash_is_unhashable() {
        let class = ClassBuilder::new("Eqish")
            .method_native("__eq__", |_| Ok(Value::Bool(true)))
            .build()
            .unwrap();
        let obj = class.call(vec![]).unwrap();
        assert_eq!(hash(&obj).unwrap_err(), RuntimeError::Unhashable("Eqish".into()));
    }

    #[test]
    fn get_attr_answers_class_and_name() {
        let class = ClassBuilder::new("Named").build().unwrap();
        let obj = class.call(vec![]).unwrap();
        let cls = get_attr(&obj, "__class__").unwrap();
        assert_eq!(str(&get_attr(&cls, "__name__").unwrap()).unwrap(), "Named");
        let err = get_attr(&obj, "missing").unwrap_err();
        assert_eq!(err.to_string(), "AttributeError: 'Named' object has no attribute 'missing'");
    }

    #[test]
    fn builtins_check_arity() {
        let err = call_builtin(BuiltinId::Hash, &[]).unwrap_err();
        assert_eq!(err.to_string(), "TypeError: hash() takes exactly one argument (0 given)");
        let ty = call_builtin(BuiltinId::Type, &[Value::Int(3)]).unwrap();
        assert_eq!(repr(&ty).unwrap(), "<class 'int'>");
    }

    #[test]
    fn strings_iterate_by_character() {
        let items = collect(&Value::str("ab")).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].as_str(), Some("b"));
    }
}
