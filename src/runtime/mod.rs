//! Runtime object model
//!
//! Classes, instances, and values of the dynamic object model that synthesized methods are
//! attached to, plus the VM that executes compiled code objects.
//!
//! ## Module Structure
//!
//! - `value` - [`Value`] and bound methods
//! - `class` - [`Class`], [`ClassBuilder`], methods and their origin
//! - `instance` - [`Instance`] attribute storage
//! - `mro` - C3 linearization
//! - `vm` - Frames, argument binding, calls
//! - `protocol` - `equals`, `repr`, `hash`, `iterate`, `match_positional`, attribute access
//! - `errors` - [`RuntimeError`]
//!
//! Values use `Rc`; the runtime is single-threaded. Compiled code is `Arc`-backed and can be
//! shared across threads through the template cache.

pub mod class;
pub mod errors;
pub mod instance;
pub mod mro;
pub mod protocol;
pub mod value;
pub mod vm;

pub use class::{Class, ClassAttr, ClassBuilder, ClassError, Function, Method, NativeFn, Origin};
pub use errors::RuntimeError;
pub use instance::Instance;
pub use protocol::{EqOutcome, ValueIter, equals, hash, is_instance, iterate, match_positional, repr, rich_eq};
pub use value::{BoundMethod, Value};
