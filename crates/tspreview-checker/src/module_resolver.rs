//! Module specifier resolution.
//!
//! Follows TypeScript's lookup order: `paths` mappings, relative and
//! absolute paths, `baseUrl`, then `node_modules` packages (including their
//! `@types` counterparts). All probing goes through the program's
//! [`Reader`], and results are cached per containing directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;
use tracing::trace;

use crate::options::{CompilerOptions, ModuleResolutionKind, PathMapping};
use crate::reader::{Reader, normalize_path};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedModule {
    pub resolved_path: PathBuf,
    /// Found under `node_modules`.
    pub is_external: bool,
    pub package_name: Option<String>,
    pub extension: ModuleExtension,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModuleExtension {
    Ts,
    Tsx,
    Dts,
    Mts,
    Cts,
    DMts,
    DCts,
    Js,
    Jsx,
    Mjs,
    Cjs,
    Json,
    Vue,
    Svelte,
    Unknown,
}

impl ModuleExtension {
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        if name.ends_with(".d.ts") {
            return ModuleExtension::Dts;
        }
        if name.ends_with(".d.mts") {
            return ModuleExtension::DMts;
        }
        if name.ends_with(".d.cts") {
            return ModuleExtension::DCts;
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some("ts") => ModuleExtension::Ts,
            Some("tsx") => ModuleExtension::Tsx,
            Some("mts") => ModuleExtension::Mts,
            Some("cts") => ModuleExtension::Cts,
            Some("js") => ModuleExtension::Js,
            Some("jsx") => ModuleExtension::Jsx,
            Some("mjs") => ModuleExtension::Mjs,
            Some("cjs") => ModuleExtension::Cjs,
            Some("json") => ModuleExtension::Json,
            Some("vue") => ModuleExtension::Vue,
            Some("svelte") => ModuleExtension::Svelte,
            _ => ModuleExtension::Unknown,
        }
    }

    pub fn is_declaration(self) -> bool {
        matches!(
            self,
            ModuleExtension::Dts | ModuleExtension::DMts | ModuleExtension::DCts
        )
    }

    pub fn is_javascript(self) -> bool {
        matches!(
            self,
            ModuleExtension::Js | ModuleExtension::Jsx | ModuleExtension::Mjs | ModuleExtension::Cjs
        )
    }

    /// Single-file component formats whose script block is analyzed.
    pub fn is_single_file_component(self) -> bool {
        matches!(self, ModuleExtension::Vue | ModuleExtension::Svelte)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ResolutionFailure {
    #[error("cannot find module '{specifier}' from '{containing_file}'")]
    NotFound {
        specifier: String,
        containing_file: String,
    },
    #[error("no `paths` target of '{specifier}' exists (from '{containing_file}')")]
    PathMappingFailed {
        specifier: String,
        containing_file: String,
    },
    #[error("{message}")]
    PackageJsonError {
        message: String,
        containing_file: String,
    },
}

impl ResolutionFailure {
    pub fn containing_file(&self) -> &str {
        match self {
            ResolutionFailure::NotFound {
                containing_file, ..
            }
            | ResolutionFailure::PathMappingFailed {
                containing_file, ..
            }
            | ResolutionFailure::PackageJsonError {
                containing_file, ..
            } => containing_file,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolutionFailure::NotFound { .. })
    }
}

const TS_EXTENSION_CANDIDATES: [&str; 7] = ["ts", "tsx", "d.ts", "mts", "cts", "d.mts", "d.cts"];
const JS_EXTENSION_CANDIDATES: [&str; 4] = ["js", "jsx", "mjs", "cjs"];
const EXPORT_CONDITIONS: [&str; 5] = ["types", "import", "module", "default", "require"];

pub struct ModuleResolver {
    reader: Arc<dyn Reader>,
    resolution_kind: ModuleResolutionKind,
    base_url: Option<PathBuf>,
    paths_base_dir: Option<PathBuf>,
    path_mappings: Vec<PathMapping>,
    allow_js: bool,
    resolution_cache: DashMap<(PathBuf, String), Result<ResolvedModule, ResolutionFailure>>,
}

impl std::fmt::Debug for ModuleResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleResolver")
            .field("resolution_kind", &self.resolution_kind)
            .field("base_url", &self.base_url)
            .field("path_mappings", &self.path_mappings.len())
            .field("cached", &self.resolution_cache.len())
            .finish()
    }
}

impl ModuleResolver {
    pub fn new(options: &CompilerOptions, reader: Arc<dyn Reader>) -> Self {
        ModuleResolver {
            reader,
            resolution_kind: options.module_resolution,
            base_url: options.base_url.clone(),
            paths_base_dir: options.paths_base_dir.clone(),
            path_mappings: options.paths.clone(),
            allow_js: options.allow_js,
            resolution_cache: DashMap::new(),
        }
    }

    /// Resolve `specifier` as imported from `containing_file`.
    pub fn resolve(
        &self,
        specifier: &str,
        containing_file: &Path,
    ) -> Result<ResolvedModule, ResolutionFailure> {
        let containing_dir = containing_file
            .parent()
            .unwrap_or(Path::new("/"))
            .to_path_buf();
        let cache_key = (containing_dir.clone(), specifier.to_string());
        if let Some(cached) = self.resolution_cache.get(&cache_key) {
            return cached.clone();
        }

        let containing_file_str = containing_file.display().to_string();
        let result = self.resolve_uncached(specifier, &containing_dir, &containing_file_str);
        trace!(specifier, from = %containing_file_str, ok = result.is_ok(), "resolved module");
        self.resolution_cache.insert(cache_key, result.clone());
        result
    }

    pub fn clear_cache(&self) {
        self.resolution_cache.clear();
    }

    pub fn resolution_kind(&self) -> ModuleResolutionKind {
        self.resolution_kind
    }

    fn resolve_uncached(
        &self,
        specifier: &str,
        containing_dir: &Path,
        containing_file: &str,
    ) -> Result<ResolvedModule, ResolutionFailure> {
        let not_found = || ResolutionFailure::NotFound {
            specifier: specifier.to_string(),
            containing_file: containing_file.to_string(),
        };

        if !self.path_mappings.is_empty() && !is_relative(specifier) {
            let (resolved, attempted) = self.try_path_mappings(specifier, containing_dir);
            if let Some(resolved) = resolved {
                return Ok(resolved);
            }
            if attempted {
                return Err(ResolutionFailure::PathMappingFailed {
                    specifier: specifier.to_string(),
                    containing_file: containing_file.to_string(),
                });
            }
        }

        if is_relative(specifier) || specifier.starts_with('/') {
            let candidate = normalize_path(&containing_dir.join(specifier));
            return self
                .try_file_or_directory(&candidate)
                .map(local_module)
                .ok_or_else(not_found);
        }

        if let Some(base_url) = &self.base_url
            && let Some(resolved) = self.try_file_or_directory(&base_url.join(specifier))
        {
            return Ok(local_module(resolved));
        }

        if self.resolution_kind == ModuleResolutionKind::Classic
            || specifier.starts_with("node:")
        {
            return Err(not_found());
        }

        self.resolve_bare_specifier(specifier, containing_dir, containing_file)
    }

    fn try_path_mappings(
        &self,
        specifier: &str,
        containing_dir: &Path,
    ) -> (Option<ResolvedModule>, bool) {
        let mut attempted = false;
        for mapping in &self.path_mappings {
            let Some(star_match) = mapping.match_specifier(specifier) else {
                continue;
            };
            attempted = true;
            for target in &mapping.targets {
                let substituted = target.replace('*', &star_match);
                let base = self
                    .base_url
                    .as_deref()
                    .or(self.paths_base_dir.as_deref())
                    .unwrap_or(containing_dir);
                let candidate = normalize_path(&base.join(&substituted));
                if let Some(resolved) = self.try_file_or_directory(&candidate) {
                    return (Some(local_module(resolved)), true);
                }
            }
        }
        (None, attempted)
    }

    fn resolve_bare_specifier(
        &self,
        specifier: &str,
        containing_dir: &Path,
        containing_file: &str,
    ) -> Result<ResolvedModule, ResolutionFailure> {
        let (package_name, subpath) = parse_package_specifier(specifier);
        let types_name = types_package_name(&package_name);

        let mut dir = Some(containing_dir);
        while let Some(current) = dir {
            let node_modules = current.join("node_modules");
            if self.reader.is_dir(&node_modules) {
                for candidate_name in [package_name.as_str(), types_name.as_str()] {
                    let package_dir = node_modules.join(candidate_name);
                    if !self.reader.is_dir(&package_dir) {
                        continue;
                    }
                    match self.resolve_package(&package_dir, subpath.as_deref(), containing_file)
                    {
                        Ok(Some(path)) => {
                            return Ok(ResolvedModule {
                                extension: ModuleExtension::from_path(&path),
                                resolved_path: path,
                                is_external: true,
                                package_name: Some(package_name.clone()),
                            });
                        }
                        Ok(None) => {}
                        Err(err) => return Err(err),
                    }
                }
            }
            dir = current.parent();
        }

        Err(ResolutionFailure::NotFound {
            specifier: specifier.to_string(),
            containing_file: containing_file.to_string(),
        })
    }

    fn resolve_package(
        &self,
        package_dir: &Path,
        subpath: Option<&str>,
        containing_file: &str,
    ) -> Result<Option<PathBuf>, ResolutionFailure> {
        let package_json_path = package_dir.join("package.json");
        let package_json = if self.reader.is_file(&package_json_path) {
            self.read_package_json(&package_json_path)
                .map_err(|message| ResolutionFailure::PackageJsonError {
                    message,
                    containing_file: containing_file.to_string(),
                })?
        } else {
            PackageJson::default()
        };

        let export_key = match subpath {
            Some(subpath) => format!("./{subpath}"),
            None => ".".to_string(),
        };
        if self.resolution_kind.uses_exports()
            && let Some(exports) = &package_json.exports
            && let Some(target) = resolve_exports(exports, &export_key)
        {
            let candidate = normalize_path(&package_dir.join(&target));
            if let Some(resolved) = self.try_declaration_sibling(&candidate) {
                return Ok(Some(resolved));
            }
        }

        if let Some(subpath) = subpath {
            return Ok(self.try_file_or_directory(&package_dir.join(subpath)));
        }

        let entry_points = [
            package_json.types.as_deref(),
            package_json.typings.as_deref(),
            package_json.main.as_deref(),
        ];
        for entry in entry_points.into_iter().flatten() {
            let candidate = normalize_path(&package_dir.join(entry));
            if let Some(resolved) = self.try_declaration_sibling(&candidate) {
                return Ok(Some(resolved));
            }
        }

        Ok(self.try_file(&package_dir.join("index")))
    }

    /// A package entry point: prefer the `.d.ts` next to a `.js` target.
    fn try_declaration_sibling(&self, path: &Path) -> Option<PathBuf> {
        let name = path.file_name()?.to_str()?;
        for js in JS_EXTENSION_CANDIDATES {
            if let Some(stem) = name.strip_suffix(&format!(".{js}")) {
                let declaration = path.with_file_name(format!("{stem}.d.ts"));
                if self.reader.is_file(&declaration) {
                    return Some(declaration);
                }
            }
        }
        self.try_file_or_directory(path)
    }

    fn try_file(&self, path: &Path) -> Option<PathBuf> {
        let name = path.file_name()?.to_str()?;

        // `./Button.js` in TypeScript source refers to `./Button.ts(x)`.
        for (js, replacements) in [
            ("js", &["ts", "tsx", "d.ts"][..]),
            ("jsx", &["tsx"][..]),
            ("mjs", &["mts", "d.mts"][..]),
            ("cjs", &["cts", "d.cts"][..]),
        ] {
            if let Some(stem) = name.strip_suffix(&format!(".{js}")) {
                for ts in replacements {
                    let candidate = path.with_file_name(format!("{stem}.{ts}"));
                    if self.reader.is_file(&candidate) {
                        return Some(candidate);
                    }
                }
            }
        }

        if ModuleExtension::from_path(path) != ModuleExtension::Unknown
            && self.reader.is_file(path)
        {
            return Some(path.to_path_buf());
        }

        for ext in self.extension_candidates() {
            let candidate = append_extension(path, ext);
            if self.reader.is_file(&candidate) {
                return Some(candidate);
            }
        }
        None
    }

    fn extension_candidates(&self) -> impl Iterator<Item = &'static str> {
        let js: &[&str] = if self.allow_js {
            &JS_EXTENSION_CANDIDATES
        } else {
            &[]
        };
        TS_EXTENSION_CANDIDATES.iter().chain(js).copied()
    }

    fn try_file_or_directory(&self, path: &Path) -> Option<PathBuf> {
        if let Some(resolved) = self.try_file(path) {
            return Some(resolved);
        }
        if self.reader.is_dir(path) {
            let package_json = path.join("package.json");
            if self.reader.is_file(&package_json)
                && let Ok(package) = self.read_package_json(&package_json)
            {
                for entry in [package.types, package.typings, package.main]
                    .into_iter()
                    .flatten()
                {
                    if let Some(resolved) = self.try_file(&normalize_path(&path.join(entry))) {
                        return Some(resolved);
                    }
                }
            }
            return self.try_file(&path.join("index"));
        }
        None
    }

    fn read_package_json(&self, path: &Path) -> Result<PackageJson, String> {
        let content = self
            .reader
            .read_to_string(path)
            .ok_or_else(|| format!("Failed to read {}", path.display()))?
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
    }
}

fn local_module(resolved_path: PathBuf) -> ResolvedModule {
    ResolvedModule {
        extension: ModuleExtension::from_path(&resolved_path),
        resolved_path,
        is_external: false,
        package_name: None,
    }
}

fn is_relative(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

/// Whether a specifier names a package rather than a file.
pub fn is_bare_specifier(specifier: &str) -> bool {
    !is_relative(specifier) && !specifier.starts_with('/') && !specifier.starts_with('#')
}

fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut raw = path.as_os_str().to_owned();
    raw.push(".");
    raw.push(ext);
    PathBuf::from(raw)
}

/// Split `@scope/pkg/sub/path` into `("@scope/pkg", Some("sub/path"))`.
pub(crate) fn parse_package_specifier(specifier: &str) -> (String, Option<String>) {
    let mut parts = specifier.splitn(if specifier.starts_with('@') { 3 } else { 2 }, '/');
    let mut name = parts.next().unwrap_or_default().to_string();
    if specifier.starts_with('@')
        && let Some(scoped) = parts.next()
    {
        name.push('/');
        name.push_str(scoped);
    }
    let subpath = parts.next().filter(|s| !s.is_empty()).map(str::to_string);
    (name, subpath)
}

/// `@types` package for a package name (`@scope/pkg` → `@types/scope__pkg`).
fn types_package_name(package_name: &str) -> String {
    match package_name.strip_prefix('@') {
        Some(scoped) => format!("@types/{}", scoped.replacen('/', "__", 1)),
        None => format!("@types/{package_name}"),
    }
}

/// Package name of a file inside `node_modules`, mapping `@types/x` back to `x`.
pub fn package_name_from_path(path: &Path) -> Option<String> {
    let components: Vec<String> = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    let index = components.iter().rposition(|c| c == "node_modules")?;
    let first = components.get(index + 1)?;
    let name = if first.starts_with('@') {
        format!("{first}/{}", components.get(index + 2)?)
    } else {
        first.clone()
    };
    Some(match name.strip_prefix("@types/") {
        Some(types) => match types.split_once("__") {
            Some((scope, pkg)) => format!("@{scope}/{pkg}"),
            None => types.to_string(),
        },
        None => name,
    })
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PackageJson {
    #[serde(default)]
    pub main: Option<String>,
    #[serde(default)]
    pub types: Option<String>,
    #[serde(default)]
    pub typings: Option<String>,
    #[serde(default)]
    pub exports: Option<PackageExports>,
}

/// `exports` is a string, a subpath map, a condition map, or a fallback list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum PackageExports {
    String(String),
    Map(FxHashMap<String, PackageExports>),
    Array(Vec<PackageExports>),
    Null(()),
}

fn resolve_exports(exports: &PackageExports, subpath: &str) -> Option<String> {
    match exports {
        PackageExports::String(target) => (subpath == ".").then(|| target.clone()),
        PackageExports::Map(map) => {
            let is_subpath_map = map.keys().any(|k| k.starts_with('.'));
            if !is_subpath_map {
                return (subpath == ".").then(|| resolve_conditions(exports)).flatten();
            }
            if let Some(entry) = map.get(subpath) {
                return resolve_conditions(entry);
            }
            // Longest matching `./prefix/*` pattern wins.
            let mut best: Option<(&String, String)> = None;
            for key in map.keys() {
                if let Some(wildcard) = match_export_pattern(key, subpath)
                    && best.as_ref().is_none_or(|(k, _)| key.len() > k.len())
                {
                    best = Some((key, wildcard));
                }
            }
            let (key, wildcard) = best?;
            let target = resolve_conditions(map.get(key)?)?;
            Some(target.replace('*', &wildcard))
        }
        PackageExports::Array(items) => items.iter().find_map(|i| resolve_exports(i, subpath)),
        PackageExports::Null(()) => None,
    }
}

fn resolve_conditions(value: &PackageExports) -> Option<String> {
    match value {
        PackageExports::String(target) => Some(target.clone()),
        PackageExports::Map(map) => EXPORT_CONDITIONS
            .iter()
            .find_map(|condition| map.get(*condition).and_then(resolve_conditions)),
        PackageExports::Array(items) => items.iter().find_map(resolve_conditions),
        PackageExports::Null(()) => None,
    }
}

fn match_export_pattern(pattern: &str, subpath: &str) -> Option<String> {
    let (prefix, suffix) = pattern.split_once('*')?;
    if !subpath.starts_with(prefix) || !subpath.ends_with(suffix) {
        return None;
    }
    let start = prefix.len();
    let end = subpath.len().saturating_sub(suffix.len());
    (end >= start).then(|| subpath[start..end].to_string())
}

#[cfg(test)]
#[path = "../tests/module_resolver_tests.rs"]
mod module_resolver_tests;
