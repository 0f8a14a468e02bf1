//! Compiler options and `tsconfig.json` loading.
//!
//! Only the options that change how declarations are found or how JSX
//! globals are named are modelled. `tsconfig.json` is JSONC, read with
//! `json5`, and `extends` chains are followed (child options win).

use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tspreview_common::limits::MAX_TSCONFIG_EXTENDS_DEPTH;

use crate::reader::{FsReader, Reader, normalize_path};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("tsconfig not found: {}", path.display())]
    NotFound { path: PathBuf },
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
    #[error("tsconfig extends cycle detected at {}", path.display())]
    ExtendsCycle { path: PathBuf },
    #[error("tsconfig extends chain too deep at {}", path.display())]
    ExtendsTooDeep { path: PathBuf },
    #[error("unsupported compilerOptions.{option} '{value}'")]
    InvalidOption { option: &'static str, value: String },
}

/// Accepts both `true` and `"true"`.
fn deserialize_bool_or_string<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        String(String),
    }

    match Option::<BoolOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(BoolOrString::Bool(b)) => Ok(Some(b)),
        Some(BoolOrString::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "off" => Ok(Some(false)),
            _ => Err(Error::custom(format!(
                "invalid boolean value: '{s}'. Expected true, false, 'true', or 'false'"
            ))),
        },
    }
}

/// `extends` is a single path or, since TypeScript 5.0, a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Extends {
    One(String),
    Many(Vec<String>),
}

impl Extends {
    fn into_vec(self) -> Vec<String> {
        match self {
            Extends::One(path) => vec![path],
            Extends::Many(paths) => paths,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TsConfig {
    #[serde(default)]
    pub extends: Option<Extends>,
    #[serde(default)]
    pub compiler_options: Option<RawCompilerOptions>,
    #[serde(default)]
    pub include: Option<Vec<String>>,
    #[serde(default)]
    pub exclude: Option<Vec<String>>,
    #[serde(default)]
    pub files: Option<Vec<String>>,
}

/// `compilerOptions` as written. Relative paths are made absolute against
/// the directory of the config file that declares them while loading.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawCompilerOptions {
    #[serde(default)]
    pub jsx: Option<String>,
    #[serde(default)]
    pub jsx_import_source: Option<String>,
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub module_resolution: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub paths: Option<indexmap::IndexMap<String, Vec<String>>>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub allow_js: Option<bool>,
    #[serde(skip)]
    paths_base_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JsxMode {
    #[default]
    Preserve,
    React,
    ReactJsx,
    ReactJsxDev,
    ReactNative,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ModuleResolutionKind {
    Classic,
    Node10,
    Node16,
    NodeNext,
    #[default]
    Bundler,
}

impl ModuleResolutionKind {
    /// Whether `package.json` `exports` maps are consulted.
    pub fn uses_exports(self) -> bool {
        matches!(
            self,
            ModuleResolutionKind::Node16
                | ModuleResolutionKind::NodeNext
                | ModuleResolutionKind::Bundler
        )
    }
}

/// One `paths` entry, split around its single `*`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathMapping {
    pub(crate) pattern: String,
    pub(crate) prefix: String,
    pub(crate) suffix: String,
    pub(crate) targets: Vec<String>,
}

impl PathMapping {
    pub fn new(pattern: &str, targets: Vec<String>) -> Self {
        let pattern = normalize_path_pattern(pattern);
        let (prefix, suffix) = match pattern.find('*') {
            Some(star) => (pattern[..star].to_string(), pattern[star + 1..].to_string()),
            None => (pattern.clone(), String::new()),
        };
        PathMapping {
            targets: targets.iter().map(|t| normalize_path_pattern(t)).collect(),
            pattern,
            prefix,
            suffix,
        }
    }

    /// Text matched by the `*`, or `""` for an exact pattern.
    pub(crate) fn match_specifier(&self, specifier: &str) -> Option<String> {
        if !self.pattern.contains('*') {
            return (self.pattern == specifier).then(String::new);
        }
        if !specifier.starts_with(&self.prefix) || !specifier.ends_with(&self.suffix) {
            return None;
        }
        let start = self.prefix.len();
        let end = specifier.len().saturating_sub(self.suffix.len());
        if end < start {
            return None;
        }
        Some(specifier[start..end].to_string())
    }

    pub(crate) fn specificity(&self) -> usize {
        self.prefix.len() + self.suffix.len()
    }
}

fn normalize_path_pattern(value: &str) -> String {
    value.trim().replace('\\', "/")
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompilerOptions {
    pub jsx: Option<JsxMode>,
    /// Module that provides the `JSX` namespace (`react`, `preact`, `solid-js`).
    pub jsx_import_source: Option<String>,
    pub module_resolution: ModuleResolutionKind,
    pub base_url: Option<PathBuf>,
    /// Sorted most specific first.
    pub paths: Vec<PathMapping>,
    /// Directory `paths` targets are relative to when no `base_url` is set.
    pub paths_base_dir: Option<PathBuf>,
    pub allow_js: bool,
}

impl CompilerOptions {
    /// Load `tsconfig.json` from disk, following `extends`.
    pub fn from_tsconfig(path: &Path) -> Result<Self, ConfigError> {
        Self::from_tsconfig_with(&FsReader, path)
    }

    pub fn from_tsconfig_with(reader: &dyn Reader, path: &Path) -> Result<Self, ConfigError> {
        let config = load_tsconfig(reader, path)?;
        CompilerOptions::resolve(config.compiler_options.unwrap_or_default())
    }

    pub fn resolve(raw: RawCompilerOptions) -> Result<Self, ConfigError> {
        let jsx = raw.jsx.as_deref().map(parse_jsx_mode).transpose()?;
        let module_resolution = match raw.module_resolution.as_deref() {
            Some(value) => parse_module_resolution(value)?,
            None => match raw.module.as_deref().map(normalize_option).as_deref() {
                Some("node16") => ModuleResolutionKind::Node16,
                Some("nodenext") => ModuleResolutionKind::NodeNext,
                Some("commonjs") => ModuleResolutionKind::Node10,
                _ => ModuleResolutionKind::Bundler,
            },
        };

        let mut paths: Vec<PathMapping> = raw
            .paths
            .unwrap_or_default()
            .into_iter()
            .filter(|(_, targets)| !targets.is_empty())
            .map(|(pattern, targets)| PathMapping::new(&pattern, targets))
            .collect();
        paths.sort_by(|left, right| {
            right
                .specificity()
                .cmp(&left.specificity())
                .then_with(|| right.pattern.len().cmp(&left.pattern.len()))
                .then_with(|| left.pattern.cmp(&right.pattern))
        });

        Ok(CompilerOptions {
            jsx,
            jsx_import_source: raw.jsx_import_source,
            module_resolution,
            base_url: raw.base_url.map(PathBuf::from),
            paths,
            paths_base_dir: raw.paths_base_dir,
            allow_js: raw.allow_js.unwrap_or(false),
        })
    }

    /// Module whose `JSX` namespace types intrinsic elements, if configured.
    pub fn jsx_namespace_module(&self) -> Option<&str> {
        if let Some(source) = &self.jsx_import_source {
            return Some(source.as_str());
        }
        match self.jsx {
            Some(JsxMode::ReactJsx | JsxMode::ReactJsxDev) => Some("react"),
            _ => None,
        }
    }
}

/// Parse `tsconfig.json` text (JSONC: comments and trailing commas allowed).
pub fn parse_tsconfig(source: &str, path: &Path) -> Result<TsConfig, ConfigError> {
    json5::from_str(source).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

/// Load a config and everything it extends into a single merged config.
pub fn load_tsconfig(reader: &dyn Reader, path: &Path) -> Result<TsConfig, ConfigError> {
    let mut visited = FxHashSet::default();
    load_tsconfig_inner(reader, &normalize_path(path), &mut visited, 0)
}

fn load_tsconfig_inner(
    reader: &dyn Reader,
    path: &Path,
    visited: &mut FxHashSet<PathBuf>,
    depth: u32,
) -> Result<TsConfig, ConfigError> {
    if depth > MAX_TSCONFIG_EXTENDS_DEPTH {
        return Err(ConfigError::ExtendsTooDeep {
            path: path.to_path_buf(),
        });
    }
    if !visited.insert(path.to_path_buf()) {
        return Err(ConfigError::ExtendsCycle {
            path: path.to_path_buf(),
        });
    }

    let source = reader
        .read_to_string(path)
        .ok_or_else(|| ConfigError::NotFound {
            path: path.to_path_buf(),
        })?
        .map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    let mut config = parse_tsconfig(&source, path)?;
    let config_dir = path.parent().unwrap_or(Path::new("/")).to_path_buf();
    if let Some(options) = config.compiler_options.as_mut() {
        absolutize_options(options, &config_dir);
    }

    if let Some(extends) = config.extends.take() {
        // Later entries of an extends list override earlier ones.
        let mut base: Option<TsConfig> = None;
        for specifier in extends.into_vec() {
            let base_path = resolve_extends_path(reader, &config_dir, &specifier);
            let loaded = load_tsconfig_inner(reader, &base_path, visited, depth + 1)?;
            base = Some(match base {
                Some(earlier) => merge_configs(earlier, loaded),
                None => loaded,
            });
        }
        if let Some(base) = base {
            config = merge_configs(base, config);
        }
    }

    visited.remove(path);
    Ok(config)
}

fn absolutize_options(options: &mut RawCompilerOptions, config_dir: &Path) {
    if let Some(base_url) = options.base_url.take() {
        let absolute = normalize_path(&config_dir.join(base_url));
        options.base_url = Some(absolute.to_string_lossy().into_owned());
    }
    if options.paths.is_some() {
        options.paths_base_dir = Some(config_dir.to_path_buf());
    }
}

fn resolve_extends_path(reader: &dyn Reader, config_dir: &Path, extends: &str) -> PathBuf {
    let with_json = |path: PathBuf| {
        if path.extension().is_some_and(|ext| ext == "json") {
            path
        } else {
            let mut raw = path.into_os_string();
            raw.push(".json");
            PathBuf::from(raw)
        }
    };

    if extends.starts_with("./") || extends.starts_with("../") || Path::new(extends).is_absolute()
    {
        return normalize_path(&with_json(config_dir.join(extends)));
    }

    // Package-provided base config: look it up in node_modules.
    let mut dir = Some(config_dir);
    while let Some(current) = dir {
        let candidate = current.join("node_modules").join(extends);
        if reader.is_file(&candidate) {
            return normalize_path(&candidate);
        }
        let json = with_json(candidate.clone());
        if reader.is_file(&json) {
            return normalize_path(&json);
        }
        let nested = candidate.join("tsconfig.json");
        if reader.is_file(&nested) {
            return normalize_path(&nested);
        }
        dir = current.parent();
    }
    normalize_path(&with_json(config_dir.join(extends)))
}

fn merge_configs(base: TsConfig, mut child: TsConfig) -> TsConfig {
    let compiler_options = match (base.compiler_options, child.compiler_options.take()) {
        (Some(base_opts), Some(child_opts)) => Some(merge_compiler_options(base_opts, child_opts)),
        (Some(base_opts), None) => Some(base_opts),
        (None, Some(child_opts)) => Some(child_opts),
        (None, None) => None,
    };

    TsConfig {
        extends: None,
        compiler_options,
        include: child.include.or(base.include),
        exclude: child.exclude.or(base.exclude),
        files: child.files.or(base.files),
    }
}

fn merge_compiler_options(
    base: RawCompilerOptions,
    child: RawCompilerOptions,
) -> RawCompilerOptions {
    let (paths, paths_base_dir) = match child.paths {
        Some(paths) => (Some(paths), child.paths_base_dir),
        None => (base.paths, base.paths_base_dir),
    };
    RawCompilerOptions {
        jsx: child.jsx.or(base.jsx),
        jsx_import_source: child.jsx_import_source.or(base.jsx_import_source),
        module: child.module.or(base.module),
        module_resolution: child.module_resolution.or(base.module_resolution),
        base_url: child.base_url.or(base.base_url),
        paths,
        allow_js: child.allow_js.or(base.allow_js),
        paths_base_dir,
    }
}

fn normalize_option(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

fn parse_jsx_mode(value: &str) -> Result<JsxMode, ConfigError> {
    Ok(match normalize_option(value).as_str() {
        "preserve" => JsxMode::Preserve,
        "react" => JsxMode::React,
        "reactjsx" => JsxMode::ReactJsx,
        "reactjsxdev" => JsxMode::ReactJsxDev,
        "reactnative" => JsxMode::ReactNative,
        _ => {
            return Err(ConfigError::InvalidOption {
                option: "jsx",
                value: value.to_string(),
            });
        }
    })
}

fn parse_module_resolution(value: &str) -> Result<ModuleResolutionKind, ConfigError> {
    Ok(match normalize_option(value).as_str() {
        "classic" => ModuleResolutionKind::Classic,
        "node" | "node10" => ModuleResolutionKind::Node10,
        "node16" => ModuleResolutionKind::Node16,
        "nodenext" => ModuleResolutionKind::NodeNext,
        "bundler" => ModuleResolutionKind::Bundler,
        _ => {
            return Err(ConfigError::InvalidOption {
                option: "moduleResolution",
                value: value.to_string(),
            });
        }
    })
}

#[cfg(test)]
#[path = "../tests/options_tests.rs"]
mod options_tests;
