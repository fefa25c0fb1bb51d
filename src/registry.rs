//! Model registry: the names route directives may refer to, and their shapes.
//!
//! The registry is filled before generation and only read afterwards. A model named in a
//! `@RequestBody` or `@Success` directive but absent here is reported as a diagnostic and
//! left out of the document.

use crate::parser::ParsedFile;
use crate::reflect::{Reflect, Shape};
use crate::type_resolver::TypeResolver;
use indexmap::IndexMap;
use log::debug;

#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: IndexMap<String, Shape>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model by example value.
    ///
    /// Only the value's type matters; registering the same name again replaces the
    /// previous shape.
    pub fn register<T: Reflect>(&mut self, name: impl Into<String>, _value: &T) {
        self.register_shape(name, T::shape());
    }

    /// Register a model by type alone.
    pub fn register_type<T: Reflect + ?Sized>(&mut self, name: impl Into<String>) {
        self.register_shape(name, T::shape());
    }

    pub fn register_shape(&mut self, name: impl Into<String>, shape: Shape) {
        let name = name.into();
        if self.models.insert(name.clone(), shape).is_some() {
            debug!("Model {} re-registered, shape replaced", name);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Shape> {
        self.models.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    /// Registered names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Register every named-field struct defined in the parsed sources under its own name.
    pub fn from_sources(parsed_files: &[ParsedFile]) -> Self {
        let resolver = TypeResolver::new(parsed_files);
        let mut registry = Self::new();
        registry.extend_from(&resolver);
        registry
    }

    /// Register the resolver's structs; names already present are kept.
    pub fn extend_from(&mut self, resolver: &TypeResolver) {
        for name in resolver.struct_names() {
            if self.contains(name) {
                continue;
            }
            if let Some(shape) = resolver.resolve_shape(name) {
                self.models.insert(name.clone(), shape);
            }
        }
        debug!("Model registry holds {} models", self.models.len());
    }
}
