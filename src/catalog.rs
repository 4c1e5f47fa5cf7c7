//! The standard validator/sanitizer catalog.
//!
//! This module provides the boundary to the catalog collaborator: a
//! thread-safe registry mapping names to standard functions. Standard
//! functions follow one fixed calling convention — the string-coerced
//! value plus fixed options — and are opaque to the pipeline; the catalog
//! ships no functions of its own.

use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::context::{StandardSanitizerFn, StandardValidatorFn};

/// Errors from catalog registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// A function with the same name is already registered.
    #[error("catalog entry '{0}' is already registered")]
    DuplicateName(String),
}

/// A registered standard function.
#[derive(Clone)]
pub enum CatalogEntry {
    /// A predicate: `(string_value, fixed_options) -> bool`.
    Validator(StandardValidatorFn),
    /// A transformer: `(string_value, fixed_options) -> new_value`.
    Sanitizer(StandardSanitizerFn),
}

/// A thread-safe registry of named standard validators and sanitizers.
///
/// Multiple threads can resolve entries concurrently while chains are
/// built; registration takes the write lock and is serialized.
///
/// # Example
///
/// ```rust
/// use dragnet::Catalog;
/// use serde_json::json;
///
/// let catalog = Catalog::new();
/// catalog
///     .register_validator("isLength", |value, options| {
///         let min = options.first().and_then(|o| o.as_u64()).unwrap_or(0) as usize;
///         value.chars().count() >= min
///     })
///     .unwrap();
/// catalog
///     .register_sanitizer("trim", |value, _| json!(value.trim()))
///     .unwrap();
///
/// assert!(catalog.contains("isLength"));
/// assert!(catalog.register_validator("isLength", |_, _| true).is_err());
/// ```
#[derive(Default)]
pub struct Catalog {
    entries: RwLock<HashMap<String, CatalogEntry>>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a standard validator under the given name.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateName` if the name is taken.
    pub fn register_validator(
        &self,
        name: impl Into<String>,
        func: impl Fn(&str, &[Value]) -> bool + Send + Sync + 'static,
    ) -> Result<(), CatalogError> {
        self.register(name.into(), CatalogEntry::Validator(Arc::new(func)))
    }

    /// Registers a standard sanitizer under the given name.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateName` if the name is taken.
    pub fn register_sanitizer(
        &self,
        name: impl Into<String>,
        func: impl Fn(&str, &[Value]) -> Value + Send + Sync + 'static,
    ) -> Result<(), CatalogError> {
        self.register(name.into(), CatalogEntry::Sanitizer(Arc::new(func)))
    }

    fn register(&self, name: String, entry: CatalogEntry) -> Result<(), CatalogError> {
        let mut entries = self.entries.write();
        if entries.contains_key(&name) {
            return Err(CatalogError::DuplicateName(name));
        }
        entries.insert(name, entry);
        Ok(())
    }

    /// Resolves an entry by name.
    pub fn get(&self, name: &str) -> Option<CatalogEntry> {
        self.entries.read().get(name).cloned()
    }

    /// Returns true if a function with the given name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.read().contains_key(name)
    }

    /// Returns the number of registered entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if no entries are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
