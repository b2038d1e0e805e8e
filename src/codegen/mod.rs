//! Template generation and compilation
//!
//! - `generators` - Per-family template source with `_i` placeholders
//! - `compiler` - Template source to [`CodeObject`]
//! - `code` - Code objects, instructions, and the constant pool

pub mod code;
pub mod compiler;
pub mod generators;

pub use code::{CodeObject, Const, Instr, Symbol};
pub use compiler::{compile, compile_def};
pub use generators::{generate, placeholder, placeholder_index};
