//! Synthesis errors.

use thiserror::Error;

use dataklass_core::MethodFamily;

use crate::template::TemplateError;

/// An error that aborts decorating a class.
#[derive(Debug, Error)]
pub enum SynthError {
    /// A declared field cannot become a constructor parameter or attribute.
    #[error("malformed field '{field}' in class '{class}': {reason}")]
    MalformedField { class: String, field: String, reason: String },

    /// A generated template failed to compile. Indicates a generator bug.
    #[error("generated {family} template for arity {arity} does not compile: {source}")]
    TemplateCompile {
        family: MethodFamily,
        arity: usize,
        source: TemplateError,
    },
}
