use super::*;
use std::path::Path;

use tspreview_checker::{CompilerOptions, MemoryReader, Program};

use crate::frameworks::Framework;

fn program(files: &[(&str, &str)]) -> Program {
    let reader = Arc::new(MemoryReader::with_files(files.iter().copied()));
    Program::new("/app", CompilerOptions::default(), reader)
}

fn props_of(source: &str, name: &str) -> Result<ResolvedType, PropsError> {
    let program = program(&[("/app/Button.tsx", source)]);
    let file = program.load(Path::new("/app/Button.tsx")).unwrap();
    let overrides = Framework::React.overrides();
    extract_component_props(&program, &overrides, &file, name)
}

fn props_text(source: &str, name: &str) -> String {
    props_of(source, name).unwrap().ty.to_string()
}

#[test]
fn annotated_parameter() {
    assert_eq!(
        props_text(
            "export function Button(props: { label: string; disabled?: boolean }) { return null; }",
            "Button",
        ),
        "{ label: string; disabled?: boolean }"
    );
}

#[test]
fn destructured_parameter_keeps_only_bound_keys() {
    let source = "interface Props { a: string; b?: number; c: boolean }\n\
                  export const Button = ({ a, b }: Props) => null;\n\
                  export const Spread = ({ a, ...rest }: Props) => null;";
    assert_eq!(props_text(source, "Button"), "{ a: string; b?: number }");
    assert_eq!(props_text(source, "Spread"), "{ a: string; b?: number; c: boolean }");
}

#[test]
fn destructuring_narrows_every_union_member() {
    let source = "type P = { a: string; b: number } | { a: string; c: boolean };\n\
                  export const Shared = ({ a }: P) => null;\n\
                  type Q = { kind: 'a'; x: string; y: number } | { kind: 'b'; z: boolean };\n\
                  export const Tagged = ({ kind, x }: Q) => null;\n\
                  export const Whole = ({ a, ...rest }: P) => null;";
    assert_eq!(props_text(source, "Shared"), "{ a: string }");
    assert_eq!(
        props_text(source, "Tagged"),
        "{ kind: \"a\"; x: string } | { kind: \"b\" }"
    );
    assert_eq!(
        props_text(source, "Whole"),
        "{ a: string; b: number } | { a: string; c: boolean }"
    );
}

#[test]
fn destructuring_narrows_recursive_named_props() {
    let source = "interface Tree { label: string; children: Tree[]; depth: number }\n\
                  export const Node = ({ label, children }: Tree) => null;";
    let resolved = props_of(source, "Node").unwrap();
    assert_eq!(
        resolved.ty.to_string(),
        "{ label: string; children: Button.tsx:Tree[] }"
    );
    assert_eq!(
        resolved.collected.get("Button.tsx:Tree").unwrap().to_string(),
        "{ label: string; children: Button.tsx:Tree[]; depth: number }"
    );
    assert!(resolved.collected.missing_references(&resolved.ty).is_empty());
}

#[test]
fn destructuring_narrows_intersections() {
    let source = "type Base = { id: string; hidden: boolean };\n\
                  export const Tile = ({ id, size }: Base & { size: number }) => null;";
    assert_eq!(props_text(source, "Tile"), "{ id: string; size: number }");
}

#[test]
fn component_type_annotation() {
    let source = "import React from 'react';\n\
                  type Props = { title: string };\n\
                  export const Card: React.FC<Props> = (props) => null;\n\
                  export const Empty: React.FC<Props> = () => null;";
    assert_eq!(props_text(source, "Card"), "{ title: string }");
    assert_eq!(props_text(source, "Empty"), "{ title: string }");
}

#[test]
fn wrapped_components() {
    let source = "import { forwardRef, memo } from 'react';\n\
                  export const Input = forwardRef<HTMLInputElement, { value: string }>((props, ref) => null);\n\
                  export const Memo = memo((props: { count: number }) => null);\n\
                  const Inner = (props: { id: string }) => null;\n\
                  export const Aliased = memo(Inner);";
    assert_eq!(props_text(source, "Input"), "{ value: string }");
    assert_eq!(props_text(source, "Memo"), "{ count: number }");
    assert_eq!(props_text(source, "Aliased"), "{ id: string }");
}

#[test]
fn class_components_use_the_base_type_argument() {
    let source = "import { Component } from 'react';\n\
                  interface Props { open: boolean }\n\
                  export class Dialog extends Component<Props> { render() { return null; } }";
    assert_eq!(props_text(source, "Dialog"), "{ open: boolean }");
}

#[test]
fn unannotated_destructuring_infers_from_defaults() {
    assert_eq!(
        props_text(
            "export const Badge = ({ tone = \"info\", size = 2, label }) => null;",
            "Badge",
        ),
        "{ tone?: string; size?: number; label?: unknown }"
    );
}

#[test]
fn components_without_parameters_take_no_props() {
    assert_eq!(props_text("export function Logo() { return null; }", "Logo"), "{}");
}

#[test]
fn default_exports() {
    assert_eq!(
        props_text("export default function (props: { href: string }) { return null; }", "default"),
        "{ href: string }"
    );
}

#[test]
fn missing_and_non_component_exports_are_errors() {
    let source = "export const answer = 42;";
    assert_eq!(
        props_of(source, "Nope").unwrap_err(),
        PropsError::NotFound {
            name: "Nope".to_string()
        }
    );
    assert_eq!(
        props_of(source, "answer").unwrap_err(),
        PropsError::NotAComponent {
            name: "answer".to_string()
        }
    );
}

fn vue_props(script: &str) -> String {
    let program = program(&[("/app/Comp.ts", script)]);
    let file = program.load(Path::new("/app/Comp.ts")).unwrap();
    let overrides = Framework::Vue.overrides();
    extract_vue_props(&program, &overrides, &file)
        .unwrap()
        .ty
        .to_string()
}

#[test]
fn vue_type_based_declarations() {
    assert_eq!(
        vue_props("const props = defineProps<{ title: string; count?: number }>();"),
        "{ title: string; count?: number }"
    );
    assert_eq!(
        vue_props(
            "interface Props { title: string; size: number }\n\
             const props = withDefaults(defineProps<Props>(), { size: 1 });"
        ),
        "{ title: string; size?: number }"
    );
}

#[test]
fn vue_runtime_declarations() {
    assert_eq!(
        vue_props(
            "defineProps({ title: String, count: { type: Number, required: true }, tags: [String, Array] });"
        ),
        "{ title?: string; count: number; tags?: string | unknown[] }"
    );
    assert_eq!(vue_props("defineProps(['a']);"), "{ a?: unknown }");
    assert_eq!(vue_props("const x = 1;"), "{}");
}

fn svelte_props(script: &str) -> String {
    let program = program(&[("/app/Comp.ts", script)]);
    let file = program.load(Path::new("/app/Comp.ts")).unwrap();
    let overrides = Framework::Svelte.overrides();
    extract_svelte_props(&program, &overrides, &file)
        .unwrap()
        .ty
        .to_string()
}

#[test]
fn svelte_exported_lets() {
    assert_eq!(
        svelte_props(
            "export let name: string;\nexport let count = 0;\nexport const VERSION = 1;\nlet internal = 2;"
        ),
        "{ name: string; count?: number }"
    );
}

#[test]
fn svelte_props_rune() {
    assert_eq!(
        svelte_props(
            "interface Props { name: string; count?: number; hidden: boolean }\n\
             let { name, count = 0 }: Props = $props();"
        ),
        "{ name: string; count?: number }"
    );
}
