//! Reverse dependency graph for crawl-cache invalidation.
//!
//! A story file's crawl embeds the component it links to, so when a file
//! changes, every file that (transitively) imports it must be crawled again.
//! The graph keeps both directions of the import relation:
//! - `dependencies`: A -> {B} (what A imports)
//! - `dependents`: B -> {A} (what imports B)

use std::path::{Path, PathBuf};

use rustc_hash::{FxHashMap, FxHashSet};

#[derive(Default, Debug)]
pub struct DependencyGraph {
    dependencies: FxHashMap<PathBuf, FxHashSet<PathBuf>>,
    dependents: FxHashMap<PathBuf, FxHashSet<PathBuf>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files that directly or indirectly import `file`, excluding `file`
    /// itself unless it sits on an import cycle.
    pub fn affected_files(&self, file: &Path) -> Vec<PathBuf> {
        let mut affected = FxHashSet::default();
        let mut stack = vec![file.to_path_buf()];

        while let Some(current) = stack.pop() {
            if let Some(dependents) = self.dependents.get(&current) {
                for dependent in dependents {
                    if affected.insert(dependent.clone()) {
                        stack.push(dependent.clone());
                    }
                }
            }
        }

        let mut affected: Vec<PathBuf> = affected.into_iter().collect();
        affected.sort();
        affected
    }

    /// Replace the imports recorded for `file`.
    pub fn update_file(&mut self, file: &Path, imports: &[PathBuf]) {
        if let Some(old_imports) = self.dependencies.get(file) {
            for imported in old_imports {
                if let Some(rev) = self.dependents.get_mut(imported) {
                    rev.remove(file);
                    if rev.is_empty() {
                        self.dependents.remove(imported);
                    }
                }
            }
        }

        if imports.is_empty() {
            self.dependencies.remove(file);
            return;
        }
        self.dependencies
            .insert(file.to_path_buf(), imports.iter().cloned().collect());
        for imported in imports {
            self.dependents
                .entry(imported.clone())
                .or_default()
                .insert(file.to_path_buf());
        }
    }

    /// Forget the outgoing edges of `file`. Files importing it keep their
    /// edges: they still import it, whether or not it exists.
    pub fn remove_file(&mut self, file: &Path) {
        if let Some(old_imports) = self.dependencies.remove(file) {
            for imported in old_imports {
                if let Some(rev) = self.dependents.get_mut(&imported) {
                    rev.remove(file);
                    if rev.is_empty() {
                        self.dependents.remove(&imported);
                    }
                }
            }
        }
    }

    pub fn dependencies(&self, file: &Path) -> Option<&FxHashSet<PathBuf>> {
        self.dependencies.get(file)
    }

    pub fn dependents(&self, file: &Path) -> Option<&FxHashSet<PathBuf>> {
        self.dependents.get(file)
    }

    pub fn contains_file(&self, file: &Path) -> bool {
        self.dependencies.contains_key(file) || self.dependents.contains_key(file)
    }

    pub fn clear(&mut self) {
        self.dependencies.clear();
        self.dependents.clear();
    }
}

#[cfg(test)]
#[path = "../tests/dependency_graph_tests.rs"]
mod dependency_graph_tests;
