//! Binder state: walks statements and fills the scope arena.

use indexmap::{IndexMap, IndexSet};
use smallvec::SmallVec;
use tspreview_syntax::SourceFile;
use tspreview_syntax::ast::{
    BindingPattern, Declaration, ExportDefault, Ident, ModuleName, Statement, StatementKind,
};

use super::{DeclItem, DeclRef, EXPORT_EQUALS, ExportEntry, Scope, ScopeId, ScopeKind};

/// Result of binding one file.
#[derive(Debug)]
pub struct BinderOutput {
    pub scopes: Vec<Scope>,
    pub ambient_modules: IndexMap<String, ScopeId>,
    pub global_scopes: SmallVec<[ScopeId; 1]>,
    pub is_module: bool,
    pub module_specifiers: Vec<String>,
}

pub struct BinderState {
    pub(super) scopes: Vec<Scope>,
    ambient_modules: IndexMap<String, ScopeId>,
    global_scopes: SmallVec<[ScopeId; 1]>,
    pub(super) module_specifiers: IndexSet<String>,
    /// Statement indices from the file root to the statement being bound.
    path: SmallVec<[u32; 4]>,
}

impl Default for BinderState {
    fn default() -> Self {
        Self::new()
    }
}

impl BinderState {
    pub fn new() -> Self {
        BinderState {
            scopes: vec![Scope::new(ScopeKind::File, None)],
            ambient_modules: IndexMap::new(),
            global_scopes: SmallVec::new(),
            module_specifiers: IndexSet::new(),
            path: SmallVec::new(),
        }
    }

    pub fn bind(mut self, file: &SourceFile) -> BinderOutput {
        let is_module = file.statements.iter().any(is_module_syntax);
        self.bind_statements(&file.statements, ScopeId::ROOT, false);
        if !is_module {
            self.global_scopes.insert(0, ScopeId::ROOT);
        }
        BinderOutput {
            scopes: self.scopes,
            ambient_modules: self.ambient_modules,
            global_scopes: self.global_scopes,
            is_module,
            module_specifiers: self.module_specifiers.into_iter().collect(),
        }
    }

    pub(super) fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.0 as usize]
    }

    fn new_scope(&mut self, kind: ScopeKind, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope::new(kind, parent));
        id
    }

    fn current_ref(&self, item: DeclItem) -> DeclRef {
        DeclRef {
            path: self.path.clone(),
            item,
        }
    }

    /// `ambient`: inside `declare namespace`/`declare module`/`declare
    /// global`, where every declaration is implicitly exported.
    fn bind_statements(&mut self, statements: &[Statement], scope: ScopeId, ambient: bool) {
        for (index, statement) in statements.iter().enumerate() {
            self.path.push(index as u32);
            self.bind_statement(statement, scope, ambient);
            self.path.pop();
        }
    }

    fn bind_statement(&mut self, statement: &Statement, scope: ScopeId, ambient: bool) {
        match &statement.kind {
            StatementKind::Import(import) => self.bind_import(scope, import),
            StatementKind::ExportNamed(export) => self.bind_export_named(scope, export),
            StatementKind::ExportAll(export) => self.bind_export_all(scope, export),
            StatementKind::ExportDefault(ExportDefault::Declaration(decl)) => {
                let name = decl
                    .name()
                    .map_or_else(|| "default".to_string(), |ident| ident.name.clone());
                let decl_ref = self.current_ref(DeclItem::Statement);
                self.declare(scope, &name, decl_ref);
                self.export(scope, "default", ExportEntry::Local(name));
            }
            StatementKind::ExportDefault(ExportDefault::Expression(expr)) => {
                match expr.skip_outer().as_identifier() {
                    Some(name) => {
                        self.export(scope, "default", ExportEntry::Local(name.to_string()));
                    }
                    None => {
                        let decl_ref = self.current_ref(DeclItem::Statement);
                        self.declare(scope, "default", decl_ref);
                        self.export(scope, "default", ExportEntry::Local("default".into()));
                    }
                }
            }
            StatementKind::ExportAssignment(expr) => {
                if let Some(name) = expr.skip_outer().as_identifier() {
                    self.export(scope, EXPORT_EQUALS, ExportEntry::Local(name.to_string()));
                }
            }
            StatementKind::Declaration {
                exported,
                declare,
                decl,
            } => self.bind_declaration(scope, decl, *exported || ambient, ambient || *declare),
            StatementKind::Expression(_) | StatementKind::Other => {}
        }
    }

    fn bind_declaration(
        &mut self,
        scope: ScopeId,
        decl: &Declaration,
        exported: bool,
        ambient: bool,
    ) {
        match decl {
            Declaration::Variable(vars) => {
                for (index, declarator) in vars.declarations.iter().enumerate() {
                    let decl_ref = self.current_ref(DeclItem::Declarator(index as u32));
                    let mut names = Vec::new();
                    collect_binding_names(&declarator.name, &mut names);
                    for ident in names {
                        self.declare(scope, &ident.name, decl_ref.clone());
                        if exported {
                            self.export(scope, &ident.name, ExportEntry::Local(ident.name.clone()));
                        }
                    }
                }
            }
            Declaration::Module(module) => self.bind_module(scope, module, exported, ambient),
            other => {
                let Some(name) = other.name().map(|ident| ident.name.clone()) else {
                    return;
                };
                let decl_ref = self.current_ref(DeclItem::Statement);
                self.declare(scope, &name, decl_ref);
                if exported {
                    self.export(scope, &name, ExportEntry::Local(name.clone()));
                }
            }
        }
    }

    fn bind_module(
        &mut self,
        scope: ScopeId,
        module: &tspreview_syntax::ast::ModuleDecl,
        exported: bool,
        ambient: bool,
    ) {
        let decl_ref = self.current_ref(DeclItem::Statement);
        match &module.name {
            ModuleName::Identifier(name) => {
                // `namespace A.B.C { }` nests; inner segments are always exported.
                let mut current = scope;
                for (i, segment) in name.segments.iter().enumerate() {
                    current = self.namespace_scope(current, &segment.name, decl_ref.clone());
                    let parent = self.scopes[current.0 as usize].parent.unwrap_or(scope);
                    if i > 0 || exported {
                        self.export(parent, &segment.name, ExportEntry::Local(segment.name.clone()));
                    }
                }
                if let Some(body) = &module.body {
                    self.bind_statements(body, current, ambient);
                }
            }
            ModuleName::String(specifier, _) => {
                let id = match self.ambient_modules.get(specifier) {
                    Some(id) => *id,
                    None => {
                        let id = self.new_scope(
                            ScopeKind::AmbientModule {
                                specifier: specifier.clone(),
                            },
                            Some(ScopeId::ROOT),
                        );
                        self.ambient_modules.insert(specifier.clone(), id);
                        id
                    }
                };
                if let Some(body) = &module.body {
                    self.bind_statements(body, id, true);
                }
            }
            ModuleName::Global => {
                let id = match self
                    .global_scopes
                    .iter()
                    .find(|id| **id != ScopeId::ROOT)
                {
                    Some(id) => *id,
                    None => {
                        let id = self.new_scope(ScopeKind::Global, Some(ScopeId::ROOT));
                        self.global_scopes.push(id);
                        id
                    }
                };
                if let Some(body) = &module.body {
                    self.bind_statements(body, id, true);
                }
            }
        }
    }

    /// Scope of namespace `name` in `scope`, created on first declaration and
    /// shared by later (merged) declarations.
    fn namespace_scope(&mut self, scope: ScopeId, name: &str, decl_ref: DeclRef) -> ScopeId {
        let existing = {
            let entry = self
                .scope_mut(scope)
                .locals
                .entry(name.to_string())
                .or_default();
            if !entry.decls.contains(&decl_ref) {
                entry.decls.push(decl_ref);
            }
            entry.namespace
        };
        if let Some(id) = existing {
            return id;
        }
        let id = self.new_scope(
            ScopeKind::Namespace {
                name: name.to_string(),
            },
            Some(scope),
        );
        if let Some(entry) = self.scope_mut(scope).locals.get_mut(name) {
            entry.namespace = Some(id);
        }
        id
    }

    pub(super) fn declare(&mut self, scope: ScopeId, name: &str, decl_ref: DeclRef) {
        self.scope_mut(scope)
            .locals
            .entry(name.to_string())
            .or_default()
            .decls
            .push(decl_ref);
    }

    pub(super) fn export(&mut self, scope: ScopeId, exported: &str, entry: ExportEntry) {
        self.scope_mut(scope)
            .exports
            .insert(exported.to_string(), entry);
    }
}

fn is_module_syntax(statement: &Statement) -> bool {
    match &statement.kind {
        StatementKind::Import(_)
        | StatementKind::ExportNamed(_)
        | StatementKind::ExportAll(_)
        | StatementKind::ExportDefault(_)
        | StatementKind::ExportAssignment(_) => true,
        StatementKind::Declaration { exported, .. } => *exported,
        StatementKind::Expression(_) | StatementKind::Other => false,
    }
}

/// Identifiers bound by a binding pattern, in source order.
pub fn collect_binding_names<'a>(pattern: &'a BindingPattern, out: &mut Vec<&'a Ident>) {
    match pattern {
        BindingPattern::Identifier(ident) => out.push(ident),
        BindingPattern::Object {
            properties, rest, ..
        } => {
            for property in properties {
                collect_binding_names(&property.value, out);
            }
            if let Some(rest) = rest {
                out.push(rest);
            }
        }
        BindingPattern::Array { elements, rest, .. } => {
            for element in elements.iter().flatten() {
                collect_binding_names(&element.pattern, out);
            }
            if let Some(rest) = rest {
                collect_binding_names(rest, out);
            }
        }
    }
}
