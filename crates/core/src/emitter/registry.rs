//! Emitter Registry
//!
//! Maps format names to emitters so callers can choose a target dialect at
//! runtime and list what is available.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use super::{EmitOptions, Emitter};
use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::ir::{Pipeline, Variant};

/// Registry for pipeline emitters, keyed by format name.
#[derive(Default)]
pub struct EmitterRegistry {
    emitters: HashMap<&'static str, Arc<dyn Emitter>>,
}

impl EmitterRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            emitters: HashMap::new(),
        }
    }

    /// A registry holding the seven built-in emitters.
    #[must_use]
    pub fn builtin(options: &EmitOptions) -> Self {
        Variant::ALL
            .into_iter()
            .fold(EmitterRegistryBuilder::new(), |builder, variant| {
                builder.with_arc(Arc::from(options.emitter_for(variant)))
            })
            .build()
    }

    /// Register an emitter under its `format_name()`, replacing any
    /// emitter already registered under that name.
    pub fn register(&mut self, emitter: impl Emitter + 'static) {
        self.register_arc(Arc::new(emitter));
    }

    /// Register an Arc-wrapped emitter.
    pub fn register_arc(&mut self, emitter: Arc<dyn Emitter>) {
        let name = emitter.format_name();
        self.emitters.insert(name, emitter);
    }

    /// Get an emitter by format name.
    ///
    /// Any dialect tag resolves to the emitter of its variant, so
    /// `jenkinsfile-scripted` finds the Jenkins emitter.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Emitter>> {
        self.emitters.get(name).cloned().or_else(|| {
            let dialect = Dialect::from_str(name).ok()?;
            let native = dialect.variant().default_dialect().tag();
            self.emitters.get(native).cloned()
        })
    }

    /// Check if an emitter is registered.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Get all registered format names, sorted.
    #[must_use]
    pub fn formats(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.emitters.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Get the number of registered emitters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.emitters.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.emitters.is_empty()
    }

    /// Emit using a specific format.
    ///
    /// # Errors
    /// Returns [`Error::UnsupportedDialect`] if the format is not registered,
    /// or the emitter's own error.
    pub fn emit(&self, format: &str, pipeline: &Pipeline) -> Result<String> {
        let emitter = self
            .get(format)
            .ok_or_else(|| Error::unsupported(format))?;
        emitter.validate(pipeline)?;
        emitter.emit(pipeline)
    }

    /// Get information about all registered emitters, sorted by format.
    #[must_use]
    pub fn info(&self) -> Vec<EmitterInfo> {
        let mut infos: Vec<_> = self
            .emitters
            .values()
            .map(|e| EmitterInfo::from_emitter(e.as_ref()))
            .collect();
        infos.sort_by_key(|i| i.format);
        infos
    }
}

/// Information about a registered emitter.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct EmitterInfo {
    /// Format name
    pub format: &'static str,
    /// File extension
    pub extension: &'static str,
    /// Human-readable description
    pub description: &'static str,
}

impl EmitterInfo {
    /// Create emitter info from an emitter.
    #[must_use]
    pub fn from_emitter(emitter: &dyn Emitter) -> Self {
        Self {
            format: emitter.format_name(),
            extension: emitter.file_extension(),
            description: emitter.description(),
        }
    }
}

/// Builder for an emitter registry.
#[derive(Default)]
pub struct EmitterRegistryBuilder {
    registry: EmitterRegistry,
}

impl EmitterRegistryBuilder {
    /// Create a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an emitter.
    #[must_use]
    pub fn with_emitter(mut self, emitter: impl Emitter + 'static) -> Self {
        self.registry.register(emitter);
        self
    }

    /// Add an Arc-wrapped emitter.
    #[must_use]
    pub fn with_arc(mut self, emitter: Arc<dyn Emitter>) -> Self {
        self.registry.register_arc(emitter);
        self
    }

    /// Build the registry.
    #[must_use]
    pub fn build(self) -> EmitterRegistry {
        self.registry
    }
}
