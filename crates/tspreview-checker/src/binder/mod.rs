//! Name binding.
//!
//! Binding turns a parsed [`SourceFile`] into a [`BoundFile`]: a flat arena
//! of [`Scope`]s (file, namespaces, `declare module "m"` blocks and
//! `declare global` blocks), each with its declared names, its export table
//! and its `export *` sources. Declarations are referenced by [`DeclRef`]
//! paths into the owned syntax tree rather than copied.

mod state;
mod state_import_export;

use std::path::PathBuf;

use indexmap::IndexMap;
use smallvec::SmallVec;
use tspreview_common::{ByteSpan, Diagnostic};
use tspreview_syntax::SourceFile;
use tspreview_syntax::ast::{
    ClassDecl, Declaration, EnumDecl, ExportDefault, Expression, Function, InterfaceDecl,
    ModuleDecl, Statement, StatementKind, TypeAliasDecl, VarKind, VariableDeclarator,
};

pub use state::BinderState;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub u32);

impl ScopeId {
    pub const ROOT: ScopeId = ScopeId(0);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScopeKind {
    File,
    Namespace { name: String },
    AmbientModule { specifier: String },
    Global,
}

#[derive(Clone, Debug)]
pub struct Scope {
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    pub locals: IndexMap<String, SymbolEntry>,
    pub exports: IndexMap<String, ExportEntry>,
    /// Specifiers of `export * from "m"`, in source order.
    pub star_exports: Vec<String>,
}

impl Scope {
    fn new(kind: ScopeKind, parent: Option<ScopeId>) -> Self {
        Scope {
            kind,
            parent,
            locals: IndexMap::new(),
            exports: IndexMap::new(),
            star_exports: Vec::new(),
        }
    }
}

/// Every declaration of one name in one scope (declaration merging keeps
/// interfaces, namespaces, functions and classes of the same name together).
#[derive(Clone, Debug, Default)]
pub struct SymbolEntry {
    pub decls: SmallVec<[DeclRef; 1]>,
    /// Set when the name is an import alias.
    pub import: Option<ImportBinding>,
    /// Scope of the (merged) namespace body, when the name is a namespace.
    pub namespace: Option<ScopeId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportBinding {
    pub specifier: String,
    pub imported: ImportedName,
    pub type_only: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImportedName {
    Default,
    Namespace,
    Named(String),
}

/// Name under which a module exposes its `export =` target.
pub const EXPORT_EQUALS: &str = "export=";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExportEntry {
    /// A name declared (or imported) in the exporting scope.
    Local(String),
    /// `export { a as b } from "m"` / `export * as ns from "m"`.
    ReExport {
        specifier: String,
        imported: ImportedName,
    },
}

/// Location of a declaration: statement indices from the file root through
/// namespace and ambient-module bodies, plus which part of the statement.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DeclRef {
    pub path: SmallVec<[u32; 4]>,
    pub item: DeclItem,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeclItem {
    /// The statement's declaration itself.
    Statement,
    /// One declarator of a variable statement.
    Declarator(u32),
}

/// Borrowed view of a declaration.
#[derive(Clone, Copy, Debug)]
pub enum DeclView<'a> {
    TypeAlias(&'a TypeAliasDecl),
    Interface(&'a InterfaceDecl),
    Class(&'a ClassDecl),
    Function(&'a Function),
    Enum(&'a EnumDecl),
    Variable {
        declarator: &'a VariableDeclarator,
        kind: VarKind,
    },
    Namespace(&'a ModuleDecl),
    /// `export default <expression>`.
    DefaultExpression(&'a Expression),
}

impl DeclView<'_> {
    pub fn is_type(&self) -> bool {
        matches!(
            self,
            DeclView::TypeAlias(_) | DeclView::Interface(_) | DeclView::Class(_) | DeclView::Enum(_)
        )
    }

    pub fn is_value(&self) -> bool {
        !matches!(self, DeclView::TypeAlias(_) | DeclView::Interface(_))
    }
}

/// A parsed and bound source file.
#[derive(Clone, Debug)]
pub struct BoundFile {
    pub path: PathBuf,
    pub source: SourceFile,
    pub diagnostics: Vec<Diagnostic>,
    pub content_hash: u64,
    pub scopes: Vec<Scope>,
    /// `declare module "m" { }` blocks by specifier.
    pub ambient_modules: IndexMap<String, ScopeId>,
    /// Scopes whose names are global: `declare global` blocks, and the file
    /// root of a script (a file without imports or exports).
    pub global_scopes: SmallVec<[ScopeId; 1]>,
    pub is_module: bool,
    /// npm package the file belongs to, for files under `node_modules`.
    pub package_name: Option<String>,
    /// Module specifiers this file imports or re-exports from, in order.
    pub module_specifiers: Vec<String>,
    /// Offset of the analyzed text inside the file on disk (non-zero for
    /// script blocks of single-file components).
    pub text_offset: u32,
}

impl BoundFile {
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0 as usize]
    }

    pub fn root(&self) -> &Scope {
        self.scope(ScopeId::ROOT)
    }

    /// Statement a declaration lives in.
    pub fn statement(&self, decl: &DeclRef) -> Option<&Statement> {
        let (last, parents) = decl.path.split_last()?;
        let mut statements: &[Statement] = &self.source.statements;
        for index in parents {
            let statement = statements.get(*index as usize)?;
            statements = match &statement.kind {
                StatementKind::Declaration {
                    decl: Declaration::Module(module),
                    ..
                } => module.body.as_deref()?,
                _ => return None,
            };
        }
        statements.get(*last as usize)
    }

    pub fn decl(&self, decl: &DeclRef) -> Option<DeclView<'_>> {
        let statement = self.statement(decl)?;
        let declaration = match &statement.kind {
            StatementKind::Declaration { decl, .. } => decl,
            StatementKind::ExportDefault(ExportDefault::Declaration(decl)) => decl,
            StatementKind::ExportDefault(ExportDefault::Expression(expr)) => {
                return Some(DeclView::DefaultExpression(expr));
            }
            _ => return None,
        };
        Some(match (declaration, decl.item) {
            (Declaration::Variable(vars), DeclItem::Declarator(index)) => DeclView::Variable {
                declarator: vars.declarations.get(index as usize)?,
                kind: vars.kind,
            },
            (Declaration::Variable(_), DeclItem::Statement) => return None,
            (Declaration::Function(func), _) => DeclView::Function(func),
            (Declaration::Class(class), _) => DeclView::Class(class),
            (Declaration::TypeAlias(alias), _) => DeclView::TypeAlias(alias),
            (Declaration::Interface(iface), _) => DeclView::Interface(iface),
            (Declaration::Enum(decl), _) => DeclView::Enum(decl),
            (Declaration::Module(module), _) => DeclView::Namespace(module),
        })
    }

    /// Byte span of a declaration in the analyzed text.
    pub fn decl_span(&self, decl: &DeclRef) -> Option<ByteSpan> {
        let statement = self.statement(decl)?;
        if let DeclItem::Declarator(index) = decl.item
            && let StatementKind::Declaration {
                decl: Declaration::Variable(vars),
                ..
            } = &statement.kind
        {
            return vars.declarations.get(index as usize).map(|d| d.span);
        }
        Some(statement.span)
    }

    /// Source text of a span of the analyzed text.
    pub fn text_of(&self, span: ByteSpan) -> &str {
        self.source.text_of(span)
    }
}

/// Parse-independent entry point: bind an already parsed file.
pub fn bind_source_file(
    path: PathBuf,
    source: SourceFile,
    diagnostics: Vec<Diagnostic>,
    content_hash: u64,
) -> BoundFile {
    let bound = BinderState::new().bind(&source);
    BoundFile {
        package_name: crate::module_resolver::package_name_from_path(&path),
        path,
        source,
        diagnostics,
        content_hash,
        scopes: bound.scopes,
        ambient_modules: bound.ambient_modules,
        global_scopes: bound.global_scopes,
        is_module: bound.is_module,
        module_specifiers: bound.module_specifiers,
        text_offset: 0,
    }
}

#[cfg(test)]
#[path = "../../tests/binder_tests.rs"]
mod binder_tests;
