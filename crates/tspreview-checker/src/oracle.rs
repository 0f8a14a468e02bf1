//! The type-checking oracle consumed by resolution.
//!
//! [`TypeOracle`] is the narrow interface the resolver and the crawler use
//! to reach source files, modules and global declarations. Name resolution
//! on top of it (aliases, re-export chains, `export =`, namespaces) lives in
//! free functions so that any oracle implementation shares it.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::trace;
use tspreview_common::limits::MAX_EXPORT_CHAIN_HOPS;

use crate::binder::{
    BoundFile, DeclRef, DeclView, EXPORT_EQUALS, ExportEntry, ImportedName, ScopeId, ScopeKind,
    SymbolEntry,
};
use crate::module_resolver::is_bare_specifier;
use crate::options::CompilerOptions;

pub trait TypeOracle: Send + Sync {
    fn options(&self) -> &CompilerOptions;

    /// Directory collected-type names and previewable ids are relative to.
    fn root_dir(&self) -> &Path;

    /// Parsed and bound file, loading it on first use.
    fn source_file(&self, path: &Path) -> Option<Arc<BoundFile>>;

    /// Module a specifier refers to: a file, or a `declare module "m"` block.
    fn resolve_module(&self, specifier: &str, containing_file: &Path) -> Option<ModuleRef>;

    /// A name declared in a global scope of any loaded file.
    fn global_symbol(&self, name: &str) -> Option<Symbol>;
}

/// A module's export table: a file root or an ambient module / namespace scope.
#[derive(Clone)]
pub struct ModuleRef {
    pub file: Arc<BoundFile>,
    pub scope: ScopeId,
}

impl ModuleRef {
    pub fn root(file: Arc<BoundFile>) -> Self {
        ModuleRef {
            file,
            scope: ScopeId::ROOT,
        }
    }
}

impl fmt::Debug for ModuleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModuleRef({}#{})", self.file.path.display(), self.scope.0)
    }
}

/// A declared name: all of its merged declarations in one scope.
#[derive(Clone)]
pub struct Symbol {
    pub file: Arc<BoundFile>,
    pub scope: ScopeId,
    pub name: String,
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.identity())
    }
}

impl Symbol {
    pub fn entry(&self) -> Option<&SymbolEntry> {
        self.file.scope(self.scope).locals.get(&self.name)
    }

    /// Declarations with their views, in source order.
    pub fn declarations(&self) -> impl Iterator<Item = (&DeclRef, DeclView<'_>)> {
        self.entry()
            .into_iter()
            .flat_map(|entry| entry.decls.iter())
            .filter_map(|decl| self.file.decl(decl).map(|view| (decl, view)))
    }

    pub fn namespace(&self) -> Option<ModuleRef> {
        let scope = self.entry()?.namespace?;
        Some(ModuleRef {
            file: self.file.clone(),
            scope,
        })
    }

    /// Dotted name including enclosing namespaces (`Forms.Field`).
    pub fn qualified_name(&self) -> String {
        let mut segments = vec![self.name.as_str()];
        let mut current = self.scope;
        while let ScopeKind::Namespace { name } = &self.file.scope(current).kind {
            segments.push(name);
            match self.file.scope(current).parent {
                Some(parent) => current = parent,
                None => break,
            }
        }
        segments.reverse();
        segments.join(".")
    }

    /// Stable identity across lookups: file path plus qualified name.
    pub fn identity(&self) -> String {
        format!("{}:{}", self.file.path.display(), self.qualified_name())
    }

    pub fn is_same(&self, other: &Symbol) -> bool {
        Arc::ptr_eq(&self.file, &other.file) && self.scope == other.scope && self.name == other.name
    }
}

#[derive(Clone, Debug)]
pub enum Binding {
    Symbol(Symbol),
    Module(ModuleRef),
    /// Import from a module that is not available (the library is not
    /// installed, or the path does not exist).
    Unresolved { specifier: String },
}

/// Outcome of resolving a (possibly qualified) name.
#[derive(Clone, Debug)]
pub struct Resolution {
    pub binding: Binding,
    /// `<module specifier>.<qualified name>` for library declarations, the
    /// bare qualified name for globals, `None` for project declarations.
    pub fully_qualified_name: Option<String>,
    /// Enum member selected by a trailing segment (`Color.Red`).
    pub member: Option<String>,
}

impl Resolution {
    fn new(binding: Binding, fully_qualified_name: Option<String>) -> Self {
        Resolution {
            binding,
            fully_qualified_name,
            member: None,
        }
    }

    pub fn symbol(&self) -> Option<&Symbol> {
        match &self.binding {
            Binding::Symbol(symbol) => Some(symbol),
            _ => None,
        }
    }
}

/// Find `name` in `scope` or its ancestors, without following imports.
pub fn lookup_local(file: &Arc<BoundFile>, scope: ScopeId, name: &str) -> Option<Symbol> {
    let mut current = Some(scope);
    while let Some(id) = current {
        let scope = file.scope(id);
        if scope.locals.contains_key(name) {
            return Some(Symbol {
                file: file.clone(),
                scope: id,
                name: name.to_string(),
            });
        }
        current = scope.parent;
    }
    None
}

/// Resolve an identifier as seen from `scope`: locals first, then globals.
pub fn resolve_identifier(
    oracle: &dyn TypeOracle,
    file: &Arc<BoundFile>,
    scope: ScopeId,
    name: &str,
) -> Option<Resolution> {
    let symbol = lookup_local(file, scope, name).or_else(|| oracle.global_symbol(name))?;
    follow_symbol(oracle, symbol, 0)
}

/// Resolve a dotted name (`React.FC`, `A.B.C`, `Color.Red`).
pub fn resolve_entity(
    oracle: &dyn TypeOracle,
    file: &Arc<BoundFile>,
    scope: ScopeId,
    segments: &[&str],
) -> Option<Resolution> {
    let (first, rest) = segments.split_first()?;
    let mut resolution = resolve_identifier(oracle, file, scope, first)?;
    for segment in rest {
        resolution = member_of(oracle, resolution, segment)?;
    }
    Some(resolution)
}

/// Resolve `segment` inside an already resolved container.
pub fn member_of(
    oracle: &dyn TypeOracle,
    container: Resolution,
    segment: &str,
) -> Option<Resolution> {
    if container.member.is_some() {
        return None;
    }
    let prefix = container.fully_qualified_name.clone();
    let mut next = match container.binding {
        Binding::Module(module) => module_export(oracle, &module, segment)?,
        Binding::Symbol(symbol) => {
            if let Some(namespace) = symbol.namespace() {
                match module_export(oracle, &namespace, segment) {
                    Some(found) => found,
                    None => return enum_member(symbol, container.fully_qualified_name, segment),
                }
            } else {
                return enum_member(symbol, container.fully_qualified_name, segment);
            }
        }
        Binding::Unresolved { specifier } => Resolution::new(Binding::Unresolved { specifier }, None),
    };
    if let Some(prefix) = prefix {
        next.fully_qualified_name = Some(format!("{prefix}.{segment}"));
    }
    Some(next)
}

fn enum_member(symbol: Symbol, prefix: Option<String>, segment: &str) -> Option<Resolution> {
    let is_enum = symbol
        .declarations()
        .any(|(_, view)| matches!(view, DeclView::Enum(_)));
    if !is_enum {
        return None;
    }
    Some(Resolution {
        binding: Binding::Symbol(symbol),
        fully_qualified_name: prefix.map(|p| format!("{p}.{segment}")),
        member: Some(segment.to_string()),
    })
}

/// Resolve an export of a module by name, following re-exports, `export *`
/// and `export =`.
pub fn module_export(oracle: &dyn TypeOracle, module: &ModuleRef, name: &str) -> Option<Resolution> {
    module_export_inner(oracle, module, name, 0)
}

/// Follow an import alias to the declaration it names.
pub fn follow_alias(oracle: &dyn TypeOracle, symbol: Symbol) -> Option<Resolution> {
    follow_symbol(oracle, symbol, 0)
}

fn follow_symbol(oracle: &dyn TypeOracle, symbol: Symbol, hops: u32) -> Option<Resolution> {
    if hops > MAX_EXPORT_CHAIN_HOPS {
        trace!(symbol = %symbol.identity(), "export chain too long");
        return None;
    }
    let Some(import) = symbol.entry().and_then(|entry| entry.import.clone()) else {
        let fqn = fully_qualified_name(&symbol);
        return Some(Resolution::new(Binding::Symbol(symbol), fqn));
    };
    import_target(
        oracle,
        &symbol.file.path,
        &import.specifier,
        &import.imported,
        hops,
    )
}

fn import_target(
    oracle: &dyn TypeOracle,
    containing_file: &Path,
    specifier: &str,
    imported: &ImportedName,
    hops: u32,
) -> Option<Resolution> {
    let import_fqn = is_bare_specifier(specifier).then(|| match imported {
        ImportedName::Default | ImportedName::Namespace => specifier.to_string(),
        ImportedName::Named(name) => format!("{specifier}.{name}"),
    });
    let Some(module) = oracle.resolve_module(specifier, containing_file) else {
        return Some(Resolution::new(
            Binding::Unresolved {
                specifier: specifier.to_string(),
            },
            import_fqn,
        ));
    };
    let mut resolution = match imported {
        ImportedName::Namespace => Resolution::new(Binding::Module(module), None),
        ImportedName::Default => module_export_inner(oracle, &module, "default", hops + 1)?,
        ImportedName::Named(name) => module_export_inner(oracle, &module, name, hops + 1)?,
    };
    if import_fqn.is_some() {
        resolution.fully_qualified_name = import_fqn;
    }
    Some(resolution)
}

fn module_export_inner(
    oracle: &dyn TypeOracle,
    module: &ModuleRef,
    name: &str,
    hops: u32,
) -> Option<Resolution> {
    if hops > MAX_EXPORT_CHAIN_HOPS {
        trace!(?module, name, "export chain too long");
        return None;
    }
    let scope = module.file.scope(module.scope);

    if let Some(entry) = scope.exports.get(name) {
        return match entry {
            ExportEntry::Local(local) => {
                let symbol = lookup_local(&module.file, module.scope, local)?;
                follow_symbol(oracle, symbol, hops + 1)
            }
            ExportEntry::ReExport {
                specifier,
                imported,
            } => import_target(oracle, &module.file.path, specifier, imported, hops + 1),
        };
    }

    if name != "default" {
        for specifier in &scope.star_exports {
            if let Some(target) = oracle.resolve_module(specifier, &module.file.path)
                && let Some(found) = module_export_inner(oracle, &target, name, hops + 1)
            {
                return Some(found);
            }
        }
    }

    // `export = X`: the default import is X itself and named imports are
    // members of X's namespace.
    if name != EXPORT_EQUALS
        && let Some(ExportEntry::Local(target)) = scope.exports.get(EXPORT_EQUALS)
    {
        let symbol = lookup_local(&module.file, module.scope, target)?;
        let resolved = follow_symbol(oracle, symbol, hops + 1)?;
        if name == "default" {
            return Some(resolved);
        }
        return match &resolved.binding {
            Binding::Symbol(symbol) => {
                let namespace = symbol.namespace()?;
                module_export_inner(oracle, &namespace, name, hops + 1)
            }
            Binding::Module(inner) => module_export_inner(oracle, inner, name, hops + 1),
            Binding::Unresolved { .. } => None,
        };
    }

    // Namespaces and ambient modules without explicit exports expose their
    // declarations directly.
    if matches!(scope.kind, ScopeKind::Global)
        && let Some(symbol) = lookup_local(&module.file, module.scope, name)
    {
        return follow_symbol(oracle, symbol, hops + 1);
    }
    None
}

/// Library or global name of a declaration; `None` for project code.
pub fn fully_qualified_name(symbol: &Symbol) -> Option<String> {
    let file = &symbol.file;
    let mut segments = vec![symbol.name.clone()];
    let mut current = symbol.scope;
    let prefix = loop {
        let scope = file.scope(current);
        match &scope.kind {
            ScopeKind::Namespace { name } => {
                segments.push(name.clone());
                current = scope.parent?;
            }
            ScopeKind::AmbientModule { specifier } => break Some(specifier.clone()),
            ScopeKind::Global => break None,
            ScopeKind::File => {
                if !file.is_module {
                    break None;
                }
                let package = file.package_name.clone()?;
                // Drop the namespace a package exposes through `export =`.
                if segments.len() > 1
                    && let Some(ExportEntry::Local(target)) = scope.exports.get(EXPORT_EQUALS)
                    && segments.last() == Some(target)
                {
                    segments.pop();
                }
                break Some(package);
            }
        }
    };
    segments.reverse();
    let qualified = segments.join(".");
    Some(match prefix {
        Some(prefix) => format!("{prefix}.{qualified}"),
        None => qualified,
    })
}

#[cfg(test)]
#[path = "../tests/oracle_tests.rs"]
mod oracle_tests;
