//! The program: a lazily populated cache of bound source files.
//!
//! Files are read through a [`Reader`], parsed, bound and cached by path
//! together with their content hash. Invalidation only marks an entry stale:
//! the next request re-reads the file and keeps the cached parse when the
//! content did not change.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;
use tracing::{debug, trace};
use tspreview_common::content_hash;
use tspreview_common::limits::MAX_SOURCE_FILE_BYTES;
use tspreview_syntax::{parse_file, parse_script_block};

use crate::binder::{BoundFile, ScopeId, bind_source_file};
use crate::module_resolver::{ModuleExtension, ModuleResolver, is_bare_specifier};
use crate::options::CompilerOptions;
use crate::oracle::{ModuleRef, Symbol, TypeOracle};
use crate::reader::{Reader, normalize_path};

#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is too large to analyze ({size} bytes)", path.display())]
    TooLarge { path: PathBuf, size: usize },

    #[error("{} has no script block", .0.display())]
    NoScript(PathBuf),
}

/// Script text embedded in a non-TypeScript file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmbeddedScript {
    pub text: String,
    /// Byte offset of `text` in the file.
    pub offset: u32,
}

/// Pulls the analyzable script out of single-file components.
pub trait ScriptExtractor: Send + Sync {
    fn extract(&self, path: &Path, text: &str) -> Option<EmbeddedScript>;
}

#[derive(Clone)]
struct CachedFile {
    file: Arc<BoundFile>,
    stale: bool,
}

pub struct Program {
    reader: Arc<dyn Reader>,
    options: CompilerOptions,
    root_dir: PathBuf,
    resolver: ModuleResolver,
    files: DashMap<PathBuf, CachedFile>,
    extractor: Option<Arc<dyn ScriptExtractor>>,
}

impl std::fmt::Debug for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Program")
            .field("root_dir", &self.root_dir)
            .field("files", &self.files.len())
            .field("resolver", &self.resolver)
            .finish()
    }
}

impl Program {
    pub fn new(root_dir: impl Into<PathBuf>, options: CompilerOptions, reader: Arc<dyn Reader>) -> Self {
        Program {
            resolver: ModuleResolver::new(&options, reader.clone()),
            reader,
            options,
            root_dir: normalize_path(&root_dir.into()),
            files: DashMap::new(),
            extractor: None,
        }
    }

    pub fn with_script_extractor(mut self, extractor: Arc<dyn ScriptExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn reader(&self) -> &Arc<dyn Reader> {
        &self.reader
    }

    pub fn resolver(&self) -> &ModuleResolver {
        &self.resolver
    }

    /// Load (or reuse) the bound file at `path`.
    pub fn load(&self, path: &Path) -> Result<Arc<BoundFile>, ProgramError> {
        let path = normalize_path(path);
        let cached = self.files.get(&path).map(|entry| entry.clone());
        if let Some(cached) = &cached
            && !cached.stale
        {
            return Ok(cached.file.clone());
        }

        let text = match self.reader.read_to_string(&path) {
            Some(Ok(text)) => text,
            Some(Err(source)) => {
                self.files.remove(&path);
                return Err(ProgramError::Read { path, source });
            }
            None => {
                self.files.remove(&path);
                return Err(ProgramError::NotFound(path));
            }
        };
        if text.len() > MAX_SOURCE_FILE_BYTES {
            self.files.remove(&path);
            return Err(ProgramError::TooLarge {
                size: text.len(),
                path,
            });
        }

        let hash = content_hash(&text);
        if let Some(cached) = cached
            && cached.file.content_hash == hash
        {
            trace!(path = %path.display(), "stale file unchanged");
            self.files.insert(
                path,
                CachedFile {
                    file: cached.file.clone(),
                    stale: false,
                },
            );
            return Ok(cached.file);
        }

        let file = Arc::new(self.parse_and_bind(&path, &text, hash)?);
        debug!(
            path = %path.display(),
            diagnostics = file.diagnostics.len(),
            "bound file"
        );
        self.files.insert(
            path,
            CachedFile {
                file: file.clone(),
                stale: false,
            },
        );
        Ok(file)
    }

    fn parse_and_bind(&self, path: &Path, text: &str, hash: u64) -> Result<BoundFile, ProgramError> {
        let name = path.to_string_lossy();
        if ModuleExtension::from_path(path).is_single_file_component() {
            let script = self
                .extractor
                .as_ref()
                .and_then(|extractor| extractor.extract(path, text))
                .ok_or_else(|| ProgramError::NoScript(path.to_path_buf()))?;
            let (source, diagnostics) = parse_script_block(&name, &script.text);
            let mut file = bind_source_file(path.to_path_buf(), source, diagnostics, hash);
            file.text_offset = script.offset;
            return Ok(file);
        }
        let (source, diagnostics) = parse_file(&name, text);
        Ok(bind_source_file(path.to_path_buf(), source, diagnostics, hash))
    }

    /// Mark a file as possibly changed; the next load re-reads it.
    pub fn invalidate(&self, path: &Path) {
        let path = normalize_path(path);
        if let Some(mut entry) = self.files.get_mut(&path) {
            entry.stale = true;
        }
        // A created or deleted file can change how any specifier resolves.
        self.resolver.clear_cache();
    }

    pub fn is_loaded(&self, path: &Path) -> bool {
        self.files.contains_key(&normalize_path(path))
    }

    /// Loaded files, sorted by path.
    pub fn loaded_files(&self) -> Vec<Arc<BoundFile>> {
        let mut files: Vec<_> = self.files.iter().map(|entry| entry.file.clone()).collect();
        files.sort_by(|a, b| a.path.cmp(&b.path));
        files
    }

    /// Files `path` imports or re-exports from, as far as they resolve.
    pub fn dependencies(&self, path: &Path) -> Vec<PathBuf> {
        let Some(file) = self.files.get(&normalize_path(path)).map(|entry| entry.file.clone()) else {
            return Vec::new();
        };
        let mut dependencies: Vec<PathBuf> = file
            .module_specifiers
            .iter()
            .filter_map(|specifier| self.resolver.resolve(specifier, &file.path).ok())
            .map(|resolved| resolved.resolved_path)
            .collect();
        dependencies.sort();
        dependencies.dedup();
        dependencies
    }

    fn ambient_module(&self, specifier: &str) -> Option<ModuleRef> {
        let files = self.loaded_files();
        for file in &files {
            if let Some(scope) = file.ambient_modules.get(specifier) {
                return Some(ModuleRef {
                    file: file.clone(),
                    scope: *scope,
                });
            }
        }
        // `declare module "*.svg"` patterns.
        files.iter().find_map(|file| {
            file.ambient_modules
                .iter()
                .find(|(pattern, _)| matches_wildcard(pattern, specifier))
                .map(|(_, scope)| ModuleRef {
                    file: file.clone(),
                    scope: *scope,
                })
        })
    }
}

fn matches_wildcard(pattern: &str, specifier: &str) -> bool {
    match pattern.split_once('*') {
        Some((prefix, suffix)) => {
            specifier.len() >= prefix.len() + suffix.len()
                && specifier.starts_with(prefix)
                && specifier.ends_with(suffix)
        }
        None => false,
    }
}

impl TypeOracle for Program {
    fn options(&self) -> &CompilerOptions {
        &self.options
    }

    fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn source_file(&self, path: &Path) -> Option<Arc<BoundFile>> {
        match self.load(path) {
            Ok(file) => Some(file),
            Err(err) => {
                trace!(error = %err, "source file unavailable");
                None
            }
        }
    }

    fn resolve_module(&self, specifier: &str, containing_file: &Path) -> Option<ModuleRef> {
        if is_bare_specifier(specifier)
            && let Some(module) = self.ambient_module(specifier)
        {
            return Some(module);
        }
        match self.resolver.resolve(specifier, containing_file) {
            Ok(resolved) => self.source_file(&resolved.resolved_path).map(ModuleRef::root),
            // Pattern declarations (`declare module "*.svg"`) also cover
            // relative imports that do not resolve to a source file.
            Err(_) => self.ambient_module(specifier),
        }
    }

    fn global_symbol(&self, name: &str) -> Option<Symbol> {
        self.loaded_files().into_iter().find_map(|file| {
            let scope = file
                .global_scopes
                .iter()
                .copied()
                .find(|scope: &ScopeId| file.scope(*scope).locals.contains_key(name))?;
            Some(Symbol {
                file,
                scope,
                name: name.to_string(),
            })
        })
    }
}

#[cfg(test)]
#[path = "../tests/program_tests.rs"]
mod program_tests;
