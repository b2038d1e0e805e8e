//! Stack VM for compiled code objects.
//!
//! A [`Frame`] executes one call. Generator functions return their frame unstarted, wrapped in
//! [`Value::Generator`]; each resume runs until the next `YIELD_VALUE` or `RETURN_VALUE`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use dataklass_core::lang::builtins::{self, BuiltinId};

use super::class::{Function, Method};
use super::errors::RuntimeError;
use super::protocol;
use super::value::Value;
use crate::codegen::{Const, Instr};
use crate::template::ast::Conversion;

/// Nested method calls allowed on one thread before a call fails with
/// [`RuntimeError::Recursion`]. Records that contain themselves reach it through `__eq__` and
/// `__hash__`.
pub const MAX_CALL_DEPTH: usize = 64;

thread_local! {
    static CALL_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Counts one active method call; the count drops with the guard.
struct DepthGuard;

impl DepthGuard {
    fn enter() -> Result<Self, RuntimeError> {
        CALL_DEPTH.with(|depth| {
            if depth.get() >= MAX_CALL_DEPTH {
                return Err(RuntimeError::Recursion);
            }
            depth.set(depth.get() + 1);
            Ok(DepthGuard)
        })
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        CALL_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Outcome of running a frame until it suspends or finishes.
#[derive(Debug)]
pub enum Step {
    Yield(Value),
    Return(Value),
}

/// Execution state of one call.
pub struct Frame {
    function: Rc<Function>,
    locals: Vec<Option<Value>>,
    stack: Vec<Value>,
    pc: usize,
    finished: bool,
}

impl Frame {
    /// Frame with parameters bound; `args` must already match the parameter list.
    fn new(function: Rc<Function>, args: Vec<Value>) -> Self {
        let mut locals: Vec<Option<Value>> = args.into_iter().map(Some).collect();
        locals.resize(function.code.nlocals(), None);
        Self {
            function,
            locals,
            stack: Vec::new(),
            pc: 0,
            finished: false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn function(&self) -> &Rc<Function> {
        &self.function
    }

    fn pop(&mut self) -> Result<Value, RuntimeError> {
        self.stack
            .pop()
            .ok_or_else(|| RuntimeError::Internal(format!("stack underflow in {}", self.function.code.name)))
    }

    fn pop_n(&mut self, n: usize) -> Result<Vec<Value>, RuntimeError> {
        if self.stack.len() < n {
            return Err(RuntimeError::Internal(format!("stack underflow in {}", self.function.code.name)));
        }
        let at = self.stack.len() - n;
        Ok(self.stack.split_off(at))
    }

    fn name(&self, i: usize) -> Result<&str, RuntimeError> {
        self.function
            .code
            .names
            .get(i)
            .map(|s| &**s)
            .ok_or_else(|| RuntimeError::Internal(format!("name index {} out of range", i)))
    }

    fn constant(&self, i: usize) -> Result<Value, RuntimeError> {
        let value = match self.function.code.consts.get(i) {
            Some(Const::None) => Value::None,
            Some(Const::Bool(b)) => Value::Bool(*b),
            Some(Const::Int(v)) => Value::Int(*v),
            Some(Const::Str(s)) => Value::str(s),
            None => return Err(RuntimeError::Internal(format!("constant index {} out of range", i))),
        };
        Ok(value)
    }

    /// Run until the frame yields or returns.
    pub fn resume(&mut self) -> Result<Step, RuntimeError> {
        if self.finished {
            return Ok(Step::Return(Value::None));
        }
        let result = self.run();
        if !matches!(result, Ok(Step::Yield(_))) {
            self.finished = true;
        }
        result
    }

    fn run(&mut self) -> Result<Step, RuntimeError> {
        let code = Rc::clone(&self.function);
        let instructions = &code.code.instructions;

        loop {
            let Some(&instr) = instructions.get(self.pc) else {
                return Err(RuntimeError::Internal(format!(
                    "fell off the end of {}",
                    self.function.code.name
                )));
            };
            self.pc += 1;

            match instr {
                Instr::LoadFast(i) => {
                    let value = match self.locals.get(i) {
                        Some(Some(v)) => v.clone(),
                        Some(None) => {
                            return Err(RuntimeError::UnboundLocal(code.code.varnames[i].to_string()));
                        }
                        None => return Err(RuntimeError::Internal(format!("local index {} out of range", i))),
                    };
                    self.stack.push(value);
                }
                Instr::StoreFast(i) => {
                    let value = self.pop()?;
                    match self.locals.get_mut(i) {
                        Some(slot) => *slot = Some(value),
                        None => return Err(RuntimeError::Internal(format!("local index {} out of range", i))),
                    }
                }
                Instr::LoadConst(i) => {
                    let value = self.constant(i)?;
                    self.stack.push(value);
                }
                Instr::LoadGlobal(i) => {
                    let name = self.name(i)?;
                    let value = match builtins::from_str(name) {
                        Some(BuiltinId::NotImplemented) => Value::NotImplemented,
                        Some(id) => Value::Builtin(id),
                        None => return Err(RuntimeError::Name(name.to_string())),
                    };
                    self.stack.push(value);
                }
                Instr::LoadAttr(i) => {
                    let obj = self.pop()?;
                    let value = protocol::get_attr(&obj, self.name(i)?)?;
                    self.stack.push(value);
                }
                Instr::StoreAttr(i) => {
                    let obj = self.pop()?;
                    let value = self.pop()?;
                    protocol::set_attr(&obj, self.name(i)?, value)?;
                }
                Instr::LabelAttr(i) => {
                    let label = format!("{}=", self.name(i)?);
                    self.stack.push(Value::str(&label));
                }
                Instr::Call(n) => {
                    let args = self.pop_n(n)?;
                    let callee = self.pop()?;
                    let result = call_value(&callee, args)?;
                    self.stack.push(result);
                }
                Instr::BuildTuple(n) => {
                    let items = self.pop_n(n)?;
                    self.stack.push(Value::from(items));
                }
                Instr::BuildString(n) => {
                    let pieces = self.pop_n(n)?;
                    let mut out = String::new();
                    for piece in &pieces {
                        match piece {
                            Value::Str(s) => out.push_str(s),
                            other => {
                                return Err(RuntimeError::Internal(format!(
                                    "BUILD_STRING expected str, got '{}'",
                                    other.type_name()
                                )));
                            }
                        }
                    }
                    self.stack.push(Value::str(&out));
                }
                Instr::FormatValue(conversion) => {
                    let value = self.pop()?;
                    let text = match conversion {
                        Conversion::Repr => protocol::repr(&value)?,
                        Conversion::Str => protocol::str(&value)?,
                    };
                    self.stack.push(Value::str(&text));
                }
                Instr::CompareEq => {
                    let rhs = self.pop()?;
                    let lhs = self.pop()?;
                    let equal = protocol::equals(&lhs, &rhs)?;
                    self.stack.push(Value::Bool(equal));
                }
                Instr::CompareIs => {
                    let rhs = self.pop()?;
                    let lhs = self.pop()?;
                    self.stack.push(Value::Bool(lhs.is(&rhs)));
                }
                Instr::PopJumpIfFalse(target) => {
                    if !self.pop()?.is_truthy() {
                        self.pc = target;
                    }
                }
                Instr::Jump(target) => self.pc = target,
                Instr::Pop => {
                    self.pop()?;
                }
                Instr::ReturnValue => return Ok(Step::Return(self.pop()?)),
                Instr::YieldValue => return Ok(Step::Yield(self.pop()?)),
            }
        }
    }
}

// ============================================================================
// Calls
// ============================================================================

/// Bind positional and keyword arguments to a function's parameters.
fn bind_arguments(function: &Function, args: Vec<Value>, kwargs: &[(&str, Value)]) -> Result<Vec<Value>, RuntimeError> {
    let code = &function.code;
    let params = code.params();
    let fname = &code.name;

    if args.len() > params.len() {
        return Err(RuntimeError::type_error(format!(
            "{}() takes {} positional arguments but {} were given",
            fname,
            params.len(),
            args.len()
        )));
    }

    let given = args.len();
    let mut bound: Vec<Option<Value>> = args.into_iter().map(Some).collect();
    bound.resize(params.len(), None);

    for (name, value) in kwargs {
        let Some(idx) = params.iter().position(|p| &**p == *name) else {
            return Err(RuntimeError::type_error(format!(
                "{}() got an unexpected keyword argument '{}'",
                fname, name
            )));
        };
        if idx < given || bound[idx].is_some() {
            return Err(RuntimeError::type_error(format!(
                "{}() got multiple values for argument '{}'",
                fname, name
            )));
        }
        bound[idx] = Some(value.clone());
    }

    let missing: Vec<String> = params
        .iter()
        .zip(&bound)
        .filter(|(_, v)| v.is_none())
        .map(|(p, _)| format!("'{}'", p))
        .collect();
    if !missing.is_empty() {
        return Err(RuntimeError::type_error(format!(
            "{}() missing {} required positional argument{}: {}",
            fname,
            missing.len(),
            if missing.len() == 1 { "" } else { "s" },
            missing.join(", ")
        )));
    }

    Ok(bound.into_iter().flatten().collect())
}

/// Call a compiled function. Generator functions return an unstarted generator.
pub fn call_function(function: &Rc<Function>, args: Vec<Value>, kwargs: &[(&str, Value)]) -> Result<Value, RuntimeError> {
    let bound = bind_arguments(function, args, kwargs)?;
    let mut frame = Frame::new(Rc::clone(function), bound);
    if function.code.is_generator {
        return Ok(Value::Generator(Rc::new(RefCell::new(frame))));
    }
    match frame.resume()? {
        Step::Return(value) => Ok(value),
        Step::Yield(_) => Err(RuntimeError::Internal(format!(
            "{} yielded but is not a generator",
            function.code.name
        ))),
    }
}

/// Call a class member. `args[0]` is the receiver.
pub fn call_method(method: &Method, args: Vec<Value>, kwargs: &[(&str, Value)]) -> Result<Value, RuntimeError> {
    let _depth = DepthGuard::enter()?;
    match method {
        Method::Code(function) => call_function(function, args, kwargs),
        Method::Native(f) if kwargs.is_empty() => f(&args),
        Method::Native(_) => Err(RuntimeError::type_error("native methods take no keyword arguments")),
    }
}

/// Call any callable value with positional arguments.
pub fn call_value(callee: &Value, args: Vec<Value>) -> Result<Value, RuntimeError> {
    match callee {
        Value::Builtin(id) => protocol::call_builtin(*id, &args),
        Value::Method(method) => call_method(method, args, &[]),
        Value::BoundMethod(bound) => {
            let mut full = Vec::with_capacity(args.len() + 1);
            full.push(bound.receiver.clone());
            full.extend(args);
            call_method(&bound.method, full, &[])
        }
        Value::Class(class) => class.call(args),
        other => Err(RuntimeError::type_error(format!(
            "'{}' object is not callable",
            other.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::compile;
    use crate::runtime::class::Origin;

    fn function(source: &str) -> Rc<Function> {
        Rc::new(Function {
            code: compile(source).unwrap(),
            origin: Origin::User,
        })
    }

    #[test]
    fn runs_locals_and_tuples() {
        let f = function("def f(self, a):\n    b = (a, a)\n    return b\n");
        let result = call_function(&f, vec![Value::None, Value::Int(4)], &[]).unwrap();
        assert_eq!(protocol::repr(&result).unwrap(), "(4, 4)");
    }

    #[test]
    fn keyword_binding() {
        let f = function("def f(self, a, b):\n    return (a, b)\n");
        let result = call_function(&f, vec![Value::None], &[("b", Value::Int(2)), ("a", Value::Int(1))]).unwrap();
        assert_eq!(protocol::repr(&result).unwrap(), "(1, 2)");
    }

    #[test]
    fn binding_errors_name_the_parameter() {
        let f = function("def f(self, a, b):\n    pass\n");
        let err = call_function(&f, vec![Value::None], &[("a", Value::Int(1))]).unwrap_err();
        assert_eq!(err.to_string(), "TypeError: f() missing 1 required positional argument: 'b'");

        let err = call_function(&f, vec![Value::None, Value::Int(1)], &[("a", Value::Int(1))]).unwrap_err();
        assert!(err.to_string().contains("multiple values for argument 'a'"));

        let err = call_function(&f, vec![Value::None], &[("c", Value::Int(1))]).unwrap_err();
        assert!(err.to_string().contains("unexpected keyword argument 'c'"));

        let err = call_function(&f, vec![Value::None; 4], &[]).unwrap_err();
        assert!(err.to_string().contains("takes 3 positional arguments but 4 were given"));
    }

    #[test]
    fn unbound_local_is_reported() {
        let f = function("def f(self):\n    if False:\n        x = 1\n    return x\n");
        let err = call_function(&f, vec![Value::None], &[]).unwrap_err();
        assert_eq!(err, RuntimeError::UnboundLocal("x".into()));
    }

    #[test]
    fn generator_yields_then_finishes() {
        let f = function("def g(self):\n    yield 1\n    yield 2\n");
        let Value::Generator(frame) = call_function(&f, vec![Value::None], &[]).unwrap() else {
            panic!("expected generator");
        };
        let mut frame = frame.borrow_mut();
        assert!(matches!(frame.resume().unwrap(), Step::Yield(Value::Int(1))));
        assert!(matches!(frame.resume().unwrap(), Step::Yield(Value::Int(2))));
        assert!(matches!(frame.resume().unwrap(), Step::Return(Value::None)));
        assert!(frame.is_finished());
    }

    #[test]
    fn calling_a_non_callable_fails() {
        let err = call_value(&Value::Int(1), vec![]).unwrap_err();
        assert_eq!(err.to_string(), "TypeError: 'int' object is not callable");
    }

    #[test]
    fn runaway_recursion_fails_and_resets_depth() {
        let class = crate::runtime::ClassBuilder::new("Selfish")
            .method_native("__hash__", |args| protocol::hash(&args[0]).map(Value::Int))
            .build()
            .unwrap();
        let obj = class.call(vec![]).unwrap();

        assert_eq!(protocol::hash(&obj).unwrap_err(), RuntimeError::Recursion);
        assert_eq!(CALL_DEPTH.with(Cell::get), 0);
    }
}
