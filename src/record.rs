//! Compile-time records.
//!
//! [`Record`] is implemented by `#[derive(Dataklass)]`. It exposes the same field metadata the
//! runtime decorator works from, so a derived struct can also be mirrored as a runtime class.

use std::rc::Rc;

use crate::runtime::{Class, ClassBuilder, ClassError};

/// Field metadata of a struct deriving `Dataklass`.
pub trait Record {
    /// Struct name, the prefix of its representation.
    const CLASS_NAME: &'static str;
    /// Field names in declaration order.
    const MATCH_ARGS: &'static [&'static str];
    /// Field types as written in the struct, aligned with `MATCH_ARGS`.
    const FIELD_TYPES: &'static [&'static str];

    fn arity() -> usize {
        Self::MATCH_ARGS.len()
    }
}

/// Build an undecorated runtime class with the fields of `R`.
///
/// Decorate the result with [`crate::synth::dataklass`] to get the runtime methods.
pub fn runtime_class<R: Record>() -> Result<Rc<Class>, ClassError> {
    R::MATCH_ARGS
        .iter()
        .zip(R::FIELD_TYPES)
        .fold(ClassBuilder::new(R::CLASS_NAME), |builder, (name, hint)| builder.field(*name, *hint))
        .build()
}
