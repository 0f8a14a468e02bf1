//! Import and export declaration binding.

use tspreview_syntax::ast::{ExportAll, ExportNamed, ImportDecl};

use super::state::BinderState;
use super::{ExportEntry, ImportBinding, ImportedName, ScopeId};

impl BinderState {
    pub(crate) fn bind_import(&mut self, scope: ScopeId, import: &ImportDecl) {
        if import.source.is_empty() {
            return;
        }
        self.module_specifiers.insert(import.source.clone());

        if let Some(default) = &import.default {
            self.declare_import(
                scope,
                &default.name,
                &import.source,
                ImportedName::Default,
                import.type_only,
            );
        }
        if let Some(namespace) = &import.namespace {
            // `import X = require("m")` binds the module like a namespace
            // import; member lookups fall through to its `export =` target.
            self.declare_import(
                scope,
                &namespace.name,
                &import.source,
                ImportedName::Namespace,
                import.type_only,
            );
        }
        for specifier in &import.named {
            self.declare_import(
                scope,
                &specifier.local.name,
                &import.source,
                imported_name(&specifier.imported),
                import.type_only || specifier.type_only,
            );
        }
    }

    fn declare_import(
        &mut self,
        scope: ScopeId,
        local: &str,
        specifier: &str,
        imported: ImportedName,
        type_only: bool,
    ) {
        self.scope_mut(scope)
            .locals
            .entry(local.to_string())
            .or_default()
            .import = Some(ImportBinding {
            specifier: specifier.to_string(),
            imported,
            type_only,
        });
    }

    pub(crate) fn bind_export_named(&mut self, scope: ScopeId, export: &ExportNamed) {
        match &export.source {
            Some(source) => {
                self.module_specifiers.insert(source.clone());
                for specifier in &export.specifiers {
                    self.export(
                        scope,
                        &specifier.exported.name,
                        ExportEntry::ReExport {
                            specifier: source.clone(),
                            imported: imported_name(&specifier.local.name),
                        },
                    );
                }
            }
            None => {
                for specifier in &export.specifiers {
                    self.export(
                        scope,
                        &specifier.exported.name,
                        ExportEntry::Local(specifier.local.name.clone()),
                    );
                }
            }
        }
    }

    pub(crate) fn bind_export_all(&mut self, scope: ScopeId, export: &ExportAll) {
        self.module_specifiers.insert(export.source.clone());
        match &export.alias {
            Some(alias) => self.export(
                scope,
                &alias.name,
                ExportEntry::ReExport {
                    specifier: export.source.clone(),
                    imported: ImportedName::Namespace,
                },
            ),
            None => {
                let scope = self.scope_mut(scope);
                if !scope.star_exports.contains(&export.source) {
                    scope.star_exports.push(export.source.clone());
                }
            }
        }
    }
}

fn imported_name(name: &str) -> ImportedName {
    if name == "default" {
        ImportedName::Default
    } else {
        ImportedName::Named(name.to_string())
    }
}
