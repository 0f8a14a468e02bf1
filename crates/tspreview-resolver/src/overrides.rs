//! Special type overrides.
//!
//! Library types such as `react.ReactNode` would expand into enormous (or
//! meaningless) shapes. An override replaces the structural expansion of a
//! fully-qualified type name with a hand-authored [`ValueType`], either fixed
//! or built from the resolved type arguments.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tspreview_types::ValueType;

/// Builds a type from resolved type arguments.
pub type GenericBuilder = Arc<dyn Fn(&[ValueType]) -> ValueType + Send + Sync>;

#[derive(Clone)]
pub enum OverrideEntry {
    Fixed(ValueType),
    Generic(GenericBuilder),
}

impl fmt::Debug for OverrideEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverrideEntry::Fixed(ty) => f.debug_tuple("Fixed").field(ty).finish(),
            OverrideEntry::Generic(_) => f.write_str("Generic(..)"),
        }
    }
}

impl OverrideEntry {
    pub fn apply(&self, args: &[ValueType]) -> ValueType {
        match self {
            OverrideEntry::Fixed(ty) => ty.clone(),
            OverrideEntry::Generic(build) => build(args),
        }
    }
}

/// Registry of overrides keyed by fully-qualified type name.
#[derive(Clone, Debug, Default)]
pub struct SpecialTypeOverrides {
    entries: IndexMap<String, OverrideEntry>,
}

impl SpecialTypeOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, entry: OverrideEntry) -> &mut Self {
        self.entries.insert(name.into(), entry);
        self
    }

    pub fn insert_fixed(&mut self, name: impl Into<String>, ty: ValueType) -> &mut Self {
        self.insert(name, OverrideEntry::Fixed(ty))
    }

    pub fn insert_generic<F>(&mut self, name: impl Into<String>, build: F) -> &mut Self
    where
        F: Fn(&[ValueType]) -> ValueType + Send + Sync + 'static,
    {
        self.insert(name, OverrideEntry::Generic(Arc::new(build)))
    }

    /// Add every entry of `other`; entries of `other` replace existing ones.
    pub fn extend(&mut self, other: SpecialTypeOverrides) {
        self.entries.extend(other.entries);
    }

    pub fn get(&self, name: &str) -> Option<&OverrideEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// The override for `name` applied to `args`, if one is registered.
    pub fn apply(&self, name: &str, args: &[ValueType]) -> Option<ValueType> {
        self.get(name).map(|entry| entry.apply(args))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "../tests/overrides_tests.rs"]
mod overrides_tests;
