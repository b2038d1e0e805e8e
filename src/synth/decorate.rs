//! The record decorator.
//!
//! Resolves a class's fields, fetches one template per enabled family, specializes each to the
//! field names, and attaches the results. Families the class defines itself are left alone.

use std::rc::Rc;

use dataklass_core::lang::magic_methods::{self, MagicMethodId};

use super::cache::TemplateRegistry;
use super::config::SynthConfig;
use super::errors::SynthError;
use super::fields::resolve_fields;
use super::specialize::specialize;
use crate::codegen::Symbol;
use crate::runtime::{Class, ClassAttr, Method};

/// Synthesize the structural methods of `class`.
///
/// ## Parameters
///
/// - `class`: the record class; methods are attached to its own dictionary.
/// - `registry`: template cache consulted per (family, arity).
/// - `config`: enabled families and `__match_args__` emission.
///
/// ## Returns
///
/// - The same class, for chaining.
///
/// ## Notes
///
/// - A family whose dunder is already in the class's own dictionary is skipped, so decorating
///   twice leaves the methods of the first pass in place.
/// - Methods are attached together after all of them are built; an error leaves the class
///   untouched.
#[tracing::instrument(skip_all, fields(class = %class.name()))]
pub fn dataklass(class: &Rc<Class>, registry: &TemplateRegistry, config: &SynthConfig) -> Result<Rc<Class>, SynthError> {
    let fields = resolve_fields(class)?;

    let mut methods = Vec::new();
    for family in config.families.iter() {
        let dunder = family.dunder();
        if class.defines(dunder) {
            tracing::debug!(%family, "class defines {}; not synthesizing", dunder);
            continue;
        }
        let template = registry.get_or_compile(family, fields.arity())?;
        let function = specialize(&template, &fields);
        methods.push((Symbol::from(dunder), ClassAttr::Method(Method::Code(Rc::new(function)))));
    }

    let attached = methods.len();
    class.set_attrs(methods);

    if config.emit_match_args {
        class.set_attr(magic_methods::as_str(MagicMethodId::MatchArgs), ClassAttr::Value(fields.to_tuple()));
    }

    tracing::debug!(arity = fields.arity(), attached, "decorated");
    Ok(Rc::clone(class))
}

/// [`dataklass`] with the process-wide registry.
pub fn dataklass_shared(class: &Rc<Class>, config: &SynthConfig) -> Result<Rc<Class>, SynthError> {
    dataklass(class, TemplateRegistry::shared(), config)
}

/// A registry paired with a configuration.
#[derive(Debug, Clone)]
pub struct Synthesizer<'r> {
    registry: &'r TemplateRegistry,
    config: SynthConfig,
}

impl<'r> Synthesizer<'r> {
    pub fn new(registry: &'r TemplateRegistry) -> Self {
        Self {
            registry,
            config: SynthConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SynthConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    pub fn registry(&self) -> &'r TemplateRegistry {
        self.registry
    }

    pub fn decorate(&self, class: &Rc<Class>) -> Result<Rc<Class>, SynthError> {
        dataklass(class, self.registry, &self.config)
    }
}

impl Synthesizer<'static> {
    /// Synthesizer over [`TemplateRegistry::shared`].
    pub fn shared() -> Self {
        Self::new(TemplateRegistry::shared())
    }
}
