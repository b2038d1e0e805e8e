//! Template cache keyed by (family, arity).
//!
//! Uses DashMap for concurrent compute-if-absent: a miss builds the template while holding the
//! shard's entry guard, so each key is compiled and published at most once. Entries are never
//! evicted.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use once_cell::sync::Lazy;

use dataklass_core::MethodFamily;

use super::errors::SynthError;
use super::template::Template;

/// Cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TemplateKey {
    pub family: MethodFamily,
    pub arity: usize,
}

impl fmt::Display for TemplateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.family, self.arity)
    }
}

/// Called once for every template actually compiled.
pub type CompileHook = Arc<dyn Fn(TemplateKey) + Send + Sync>;

static SHARED: Lazy<TemplateRegistry> = Lazy::new(TemplateRegistry::new);

/// Cache of compiled templates.
///
/// ## Notes
///
/// - `Send + Sync`; share one registry across threads by reference.
/// - The compile counter and hook fire after the shard lock is released.
#[derive(Default)]
pub struct TemplateRegistry {
    templates: DashMap<TemplateKey, Arc<Template>>,
    compiles: AtomicUsize,
    hits: AtomicUsize,
    hook: Option<CompileHook>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry that reports every compilation to `hook`.
    pub fn with_compile_hook(hook: impl Fn(TemplateKey) + Send + Sync + 'static) -> Self {
        Self {
            hook: Some(Arc::new(hook)),
            ..Self::default()
        }
    }

    /// Process-wide registry, created on first use.
    pub fn shared() -> &'static TemplateRegistry {
        &SHARED
    }

    /// Return the template for `(family, arity)`, compiling it on the first request.
    ///
    /// ## Returns
    ///
    /// - The same `Arc<Template>` for every request of one key.
    ///
    /// ## Errors
    ///
    /// - [`SynthError::TemplateCompile`] if the generated source does not compile. Nothing is
    ///   cached in that case.
    #[tracing::instrument(skip(self), level = "debug")]
    pub fn get_or_compile(&self, family: MethodFamily, arity: usize) -> Result<Arc<Template>, SynthError> {
        let key = TemplateKey { family, arity };

        if let Some(template) = self.templates.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(%key, "template cache hit");
            return Ok(Arc::clone(&template));
        }

        let (template, compiled) = match self.templates.entry(key) {
            Entry::Occupied(entry) => (Arc::clone(entry.get()), false),
            Entry::Vacant(entry) => {
                let template = Arc::new(Template::build(family, arity)?);
                entry.insert(Arc::clone(&template));
                (template, true)
            }
        };

        if compiled {
            self.compiles.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(%key, "template compiled");
            if let Some(hook) = &self.hook {
                hook(key);
            }
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(%key, "template cache hit after race");
        }
        Ok(template)
    }

    /// Cached template, without compiling or counting.
    pub fn get(&self, family: MethodFamily, arity: usize) -> Option<Arc<Template>> {
        self.templates
            .get(&TemplateKey { family, arity })
            .map(|t| Arc::clone(&t))
    }

    /// Compile every given family for arities `0..=max_arity`.
    pub fn prewarm(&self, families: impl IntoIterator<Item = MethodFamily>, max_arity: usize) -> Result<(), SynthError> {
        for family in families {
            for arity in 0..=max_arity {
                self.get_or_compile(family, arity)?;
            }
        }
        Ok(())
    }

    /// Number of templates compiled by this registry.
    pub fn compile_count(&self) -> usize {
        self.compiles.load(Ordering::Relaxed)
    }

    /// Number of requests answered from the cache.
    pub fn hit_count(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Cached keys, sorted.
    pub fn keys(&self) -> Vec<TemplateKey> {
        let mut keys: Vec<TemplateKey> = self.templates.iter().map(|entry| *entry.key()).collect();
        keys.sort();
        keys
    }
}

impl fmt::Debug for TemplateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateRegistry")
            .field("templates", &self.len())
            .field("compiles", &self.compile_count())
            .field("hits", &self.hit_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn registry_is_thread_safe() {
        assert_send_sync::<TemplateRegistry>();
        assert_send_sync::<Template>();
    }

    #[test]
    fn second_request_is_a_hit() {
        let registry = TemplateRegistry::new();
        let a = registry.get_or_compile(MethodFamily::Repr, 2).unwrap();
        let b = registry.get_or_compile(MethodFamily::Repr, 2).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.compile_count(), 1);
        assert_eq!(registry.hit_count(), 1);
    }

    #[test]
    fn families_are_separate_partitions() {
        let registry = TemplateRegistry::new();
        registry.get_or_compile(MethodFamily::Init, 2).unwrap();
        registry.get_or_compile(MethodFamily::Eq, 2).unwrap();
        registry.get_or_compile(MethodFamily::Init, 3).unwrap();
        assert_eq!(registry.compile_count(), 3);
        assert_eq!(
            registry.keys(),
            vec![
                TemplateKey { family: MethodFamily::Init, arity: 2 },
                TemplateKey { family: MethodFamily::Init, arity: 3 },
                TemplateKey { family: MethodFamily::Eq, arity: 2 },
            ]
        );
    }

    #[test]
    fn hook_sees_each_compilation_once() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let registry = TemplateRegistry::with_compile_hook(move |key| sink.lock().unwrap().push(key));
        registry.prewarm([MethodFamily::Hash], 1).unwrap();
        registry.prewarm([MethodFamily::Hash], 2).unwrap();
        let seen = seen.lock().unwrap();
        assert_eq!(seen.iter().map(|k| k.arity).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(registry.hit_count(), 2);
    }

    #[test]
    fn concurrent_requests_compile_once() {
        let registry = TemplateRegistry::new();
        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for arity in 0..4 {
                        registry.get_or_compile(MethodFamily::Eq, arity).unwrap();
                    }
                });
            }
        });
        assert_eq!(registry.compile_count(), 4);
        assert_eq!(registry.hit_count(), 28);
    }
}
