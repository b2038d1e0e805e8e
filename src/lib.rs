#![forbid(unsafe_code)]
//! dataklass: structural methods for record types, compiled once per arity.
//!
//! A record class declares an ordered list of fields. The engine synthesizes its constructor,
//! representation, equality, and optionally iteration and hashing. Each method family is
//! generated as template-language source over placeholders `_0.._N-1`, compiled once per arity,
//! cached, and *specialized* to a concrete class by rewriting the compiled name tables. The
//! instruction stream and constant pool of a template are shared by every class of that arity.
//!
//! ## Layout
//!
//! - `template` - Lexer, parser, and diagnostics of the template language
//! - `codegen` - Per-family template generators and the template compiler
//! - `runtime` - Classes, instances, values, the VM, and object protocols
//! - `synth` - Field resolution, template cache, specialization, the decorator
//! - `record` - The [`Record`] trait implemented by `#[derive(Dataklass)]`
//! - `cli` - The `dataklass` command-line tool
//!
//! ## Example
//!
//! ```rust
//! use dataklass::runtime::{ClassBuilder, Value, repr};
//! use dataklass::synth::{SynthConfig, TemplateRegistry, dataklass};
//!
//! let registry = TemplateRegistry::new();
//! let class = ClassBuilder::new("Coordinates")
//!     .field("x", "int")
//!     .field("y", "int")
//!     .build()
//!     .unwrap();
//! dataklass(&class, &registry, &SynthConfig::default()).unwrap();
//!
//! let c = class.call(vec![Value::Int(2), Value::Int(3)]).unwrap();
//! assert_eq!(repr(&c).unwrap(), "Coordinates(x=2, y=3)");
//! ```
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **True invariants**: If a panic represents an engine bug (logic error), use `.expect("INVARIANT: reason")` or an
//!   `assert!` with an `INVARIANT:` message. Specializing a template with a field list of the wrong arity is one.

// Lets `#[derive(Dataklass)]` refer to `::dataklass::Record` inside this crate's own tests.
extern crate self as dataklass;

pub mod cli;
pub mod codegen;
pub mod record;
pub mod runtime;
pub mod synth;
pub mod template;

pub use dataklass_core::MethodFamily;
pub use dataklass_derive::Dataklass;
pub use record::Record;
pub use synth::{SynthConfig, SynthError, TemplateRegistry, dataklass, dataklass_shared};
