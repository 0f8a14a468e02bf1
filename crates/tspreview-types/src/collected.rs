//! `CollectedTypes`: the named-type side table of a resolved graph.

use indexmap::IndexMap;
use indexmap::map::Entry;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::value_type::ValueType;

/// Ordered map from collected type name (`src/tree.ts:Tree<string>`) to its
/// expansion. Entries may reference each other, and themselves, through
/// [`ValueType::Name`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectedTypes {
    entries: IndexMap<String, ValueType>,
}

impl CollectedTypes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ValueType> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Register an expansion. The first registration of a name wins: an
    /// identity always expands to the same shape within one graph.
    pub fn insert(&mut self, name: impl Into<String>, ty: ValueType) -> bool {
        match self.entries.entry(name.into()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(ty);
                true
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ValueType)> {
        self.entries.iter().map(|(name, ty)| (name.as_str(), ty))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Merge another table into this one (existing names win).
    pub fn extend(&mut self, other: CollectedTypes) {
        for (name, ty) in other.entries {
            self.insert(name, ty);
        }
    }

    /// `name` references reachable from `root` or from any entry that have
    /// no entry of their own. Empty for a well-formed graph.
    pub fn missing_references<'a>(&'a self, root: &'a ValueType) -> Vec<&'a str> {
        let mut missing = Vec::new();
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let mut pending: Vec<&str> = root.referenced_names();
        for ty in self.entries.values() {
            pending.extend(ty.referenced_names());
        }
        while let Some(name) = pending.pop() {
            if !seen.insert(name) {
                continue;
            }
            if !self.contains(name) {
                missing.push(name);
            }
        }
        missing.sort_unstable();
        missing
    }

    /// Keep only the entries reachable from `root`, preserving order.
    pub fn retain_reachable(&mut self, root: &ValueType) {
        let mut reachable: FxHashSet<String> = FxHashSet::default();
        let mut pending: Vec<String> = root
            .referenced_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        while let Some(name) = pending.pop() {
            if !reachable.insert(name.clone()) {
                continue;
            }
            if let Some(ty) = self.entries.get(&name) {
                pending.extend(ty.referenced_names().into_iter().map(str::to_string));
            }
        }
        self.entries.retain(|name, _| reachable.contains(name));
    }
}

impl FromIterator<(String, ValueType)> for CollectedTypes {
    fn from_iter<I: IntoIterator<Item = (String, ValueType)>>(iter: I) -> Self {
        let mut collected = CollectedTypes::new();
        for (name, ty) in iter {
            collected.insert(name, ty);
        }
        collected
    }
}

impl IntoIterator for CollectedTypes {
    type Item = (String, ValueType);
    type IntoIter = indexmap::map::IntoIter<String, ValueType>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
#[path = "../tests/collected_tests.rs"]
mod collected_tests;
