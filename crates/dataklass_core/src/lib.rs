//! Provide the canonical vocabulary shared by the dataklass synthesis engine and its derive macro.
//!
//! This crate is intentionally small and dependency-free. It holds the registries that both
//! the runtime engine (template generators, template lexer, VM builtins) and the compile-time
//! derive macro consult, so the two paths agree on spellings.
//!
//! ## Notes
//!
//! - No IO, no global state, no engine types.
//! - Current scope: method families and their dunder spellings, template-language keywords, and
//!   template-language builtins.

pub mod lang;

pub use lang::families::{FAMILIES, MethodFamily};
