use super::*;
use tspreview_syntax::parse_file;

fn bind(path: &str, source: &str) -> BoundFile {
    let (file, diagnostics) = parse_file(path, source);
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    bind_source_file(PathBuf::from(path), file, diagnostics, 0)
}

#[test]
fn test_exported_declarations() {
    let file = bind(
        "/p/a.ts",
        "export interface Props { a: string }\n\
         export type Alias = Props;\n\
         export const { x, y: renamed } = obj;\n\
         function hidden() {}\n\
         export enum Color { Red }\n",
    );
    assert!(file.is_module);
    let root = file.root();
    for name in ["Props", "Alias", "x", "renamed", "Color"] {
        assert_eq!(
            root.exports.get(name),
            Some(&ExportEntry::Local(name.to_string())),
            "{name}"
        );
    }
    assert!(root.locals.contains_key("hidden"));
    assert!(!root.exports.contains_key("hidden"));
    assert!(!root.locals.contains_key("y"));
}

#[test]
fn test_decl_views() {
    let file = bind(
        "/p/a.ts",
        "export const a = 1, b = 'x';\nexport interface I {}\nexport default function Button() {}\n",
    );
    let root = file.root();
    let b = &root.locals["b"].decls[0];
    assert_eq!(b.item, DeclItem::Declarator(1));
    assert!(matches!(file.decl(b), Some(DeclView::Variable { .. })));
    assert!(matches!(
        file.decl(&root.locals["I"].decls[0]),
        Some(DeclView::Interface(_))
    ));
    assert_eq!(
        root.exports.get("default"),
        Some(&ExportEntry::Local("Button".into()))
    );
    assert!(matches!(
        file.decl(&root.locals["Button"].decls[0]),
        Some(DeclView::Function(_))
    ));
}

#[test]
fn test_default_expression_exports() {
    let by_name = bind("/p/a.ts", "const meta = {};\nexport default meta;\n");
    assert_eq!(
        by_name.root().exports.get("default"),
        Some(&ExportEntry::Local("meta".into()))
    );

    let literal = bind("/p/b.ts", "export default { title: 'x' };\n");
    let entry = &literal.root().locals["default"];
    assert!(matches!(
        literal.decl(&entry.decls[0]),
        Some(DeclView::DefaultExpression(_))
    ));
}

#[test]
fn test_imports_are_recorded() {
    let file = bind(
        "/p/a.ts",
        "import React, { type FC, default as Other, useState as use } from 'react';\n\
         import * as ns from './ns';\n\
         import fs = require('fs');\n",
    );
    let root = file.root();
    let react = root.locals["React"].import.as_ref().unwrap();
    assert_eq!(react.specifier, "react");
    assert_eq!(react.imported, ImportedName::Default);

    let fc = root.locals["FC"].import.as_ref().unwrap();
    assert!(fc.type_only);
    assert_eq!(fc.imported, ImportedName::Named("FC".into()));

    assert_eq!(
        root.locals["Other"].import.as_ref().unwrap().imported,
        ImportedName::Default
    );
    assert_eq!(
        root.locals["use"].import.as_ref().unwrap().imported,
        ImportedName::Named("useState".into())
    );
    assert_eq!(
        root.locals["ns"].import.as_ref().unwrap().imported,
        ImportedName::Namespace
    );
    assert_eq!(
        root.locals["fs"].import.as_ref().unwrap().imported,
        ImportedName::Namespace
    );
    assert_eq!(file.module_specifiers, vec!["react", "./ns", "fs"]);
}

#[test]
fn test_re_exports() {
    let file = bind(
        "/p/index.ts",
        "export { Button as default, Card } from './card';\n\
         export * from './all';\n\
         export * as icons from './icons';\n\
         export * from './all';\n",
    );
    let root = file.root();
    assert_eq!(
        root.exports.get("default"),
        Some(&ExportEntry::ReExport {
            specifier: "./card".into(),
            imported: ImportedName::Named("Button".into()),
        })
    );
    assert_eq!(
        root.exports.get("icons"),
        Some(&ExportEntry::ReExport {
            specifier: "./icons".into(),
            imported: ImportedName::Namespace,
        })
    );
    assert_eq!(root.star_exports, vec!["./all"]);
    assert_eq!(file.module_specifiers, vec!["./card", "./all", "./icons"]);
}

#[test]
fn test_namespaces_merge_and_nest() {
    let file = bind(
        "/p/a.ts",
        "export namespace A.B { export interface X {} }\n\
         export namespace A { export type Y = string; interface Hidden {} }\n",
    );
    let root = file.root();
    let a = root.locals["A"].namespace.unwrap();
    assert_eq!(root.locals["A"].decls.len(), 2);
    let a_scope = file.scope(a);
    assert!(a_scope.exports.contains_key("B"));
    assert!(a_scope.exports.contains_key("Y"));
    assert!(!a_scope.exports.contains_key("Hidden"));
    let b = a_scope.locals["B"].namespace.unwrap();
    assert_eq!(file.scope(b).parent, Some(a));
    assert!(file.scope(b).exports.contains_key("X"));
}

#[test]
fn test_ambient_modules_and_globals() {
    let file = bind(
        "/p/types.d.ts",
        "declare module 'virtual:icons' { interface Icon {} }\n\
         declare global { interface Window { app: string } }\n\
         export {};\n",
    );
    let module = file.ambient_modules["virtual:icons"];
    assert!(file.scope(module).exports.contains_key("Icon"));
    assert_eq!(file.global_scopes.len(), 1);
    let global = file.scope(file.global_scopes[0]);
    assert_eq!(global.kind, ScopeKind::Global);
    assert!(global.locals.contains_key("Window"));
}

#[test]
fn test_script_root_is_global() {
    let file = bind("/p/globals.d.ts", "declare interface Theme { dark: boolean }\n");
    assert!(!file.is_module);
    assert_eq!(file.global_scopes.as_slice(), &[ScopeId::ROOT]);
}

#[test]
fn test_export_equals() {
    let file = bind(
        "/p/node_modules/@types/lib/index.d.ts",
        "declare namespace Lib { interface Options {} }\nexport = Lib;\n",
    );
    assert_eq!(
        file.root().exports.get(EXPORT_EQUALS),
        Some(&ExportEntry::Local("Lib".into()))
    );
    assert_eq!(file.package_name.as_deref(), Some("lib"));
    let ns = file.root().locals["Lib"].namespace.unwrap();
    assert!(file.scope(ns).exports.contains_key("Options"));
}

#[test]
fn test_decl_span_of_declarator() {
    let source = "export const first = 1, second = 2;\n";
    let file = bind("/p/a.ts", source);
    let decl = &file.root().locals["second"].decls[0];
    let span = file.decl_span(decl).unwrap();
    assert_eq!(file.text_of(span), "second = 2");
}
