//! Runtime errors raised while executing methods or applying protocols.

use thiserror::Error;

/// An error raised by the VM or a protocol function.
///
/// Messages carry a Python-style category prefix so reports read like the language the
/// templates are written in.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("TypeError: {0}")]
    Type(String),
    #[error("AttributeError: {0}")]
    Attribute(String),
    #[error("NameError: name '{0}' is not defined")]
    Name(String),
    #[error("UnboundLocalError: local variable '{0}' referenced before assignment")]
    UnboundLocal(String),
    #[error("TypeError: unhashable type: '{0}'")]
    Unhashable(String),
    /// Method calls nested deeper than [`super::vm::MAX_CALL_DEPTH`].
    #[error("RecursionError: maximum recursion depth exceeded")]
    Recursion,
    /// Malformed code object (bad table index, stack underflow). Never produced by compiled
    /// templates.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RuntimeError {
    pub fn type_error(message: impl Into<String>) -> Self {
        RuntimeError::Type(message.into())
    }

    pub fn no_attribute(type_name: &str, attr: &str) -> Self {
        RuntimeError::Attribute(format!("'{}' object has no attribute '{}'", type_name, attr))
    }
}
