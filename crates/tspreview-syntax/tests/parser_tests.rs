//! Tests for declaration-level parsing

use crate::ast::*;
use crate::parser::ParserState;

fn parse(file_name: &str, source: &str) -> (SourceFile, Vec<tspreview_common::Diagnostic>) {
    let mut parser = ParserState::new(file_name.to_string(), source.to_string());
    let file = parser.parse_source_file();
    (file, parser.into_diagnostics())
}

fn parse_ok(file_name: &str, source: &str) -> SourceFile {
    let (file, diagnostics) = parse(file_name, source);
    assert!(
        diagnostics.is_empty(),
        "Expected no diagnostics, got {diagnostics:?}"
    );
    file
}

fn declaration(statement: &Statement) -> &Declaration {
    match &statement.kind {
        StatementKind::Declaration { decl, .. } => decl,
        other => panic!("Expected declaration, got {other:?}"),
    }
}

fn single_initializer(statement: &Statement) -> &Expression {
    match declaration(statement) {
        Declaration::Variable(var) => var.declarations[0]
            .init
            .as_ref()
            .expect("initializer"),
        other => panic!("Expected variable, got {other:?}"),
    }
}

#[test]
fn test_interface_members() {
    let file = parse_ok(
        "props.ts",
        r#"
export interface ButtonProps extends Base<string>, Other {
  readonly label: string;
  size?: "small" | "large";
  onClick(event: MouseEvent): void;
  [key: string]: unknown;
  "data-id": number
}
"#,
    );
    assert_eq!(file.statements.len(), 1);
    let StatementKind::Declaration { exported, decl, .. } = &file.statements[0].kind else {
        panic!("Expected declaration");
    };
    assert!(*exported);
    let Declaration::Interface(iface) = decl else {
        panic!("Expected interface");
    };
    assert_eq!(iface.name.name, "ButtonProps");
    assert_eq!(iface.extends.len(), 2);
    assert_eq!(iface.members.len(), 5);
    match &iface.members[0].kind {
        TypeMemberKind::Property {
            name,
            optional,
            readonly,
            ..
        } => {
            assert_eq!(name.as_text().as_deref(), Some("label"));
            assert!(!optional);
            assert!(readonly);
        }
        other => panic!("Expected property, got {other:?}"),
    }
    match &iface.members[1].kind {
        TypeMemberKind::Property {
            optional, ty: Some(ty), ..
        } => {
            assert!(optional);
            assert!(matches!(&ty.kind, TypeKind::Union(members) if members.len() == 2));
        }
        other => panic!("Expected optional property, got {other:?}"),
    }
    assert!(matches!(
        iface.members[2].kind,
        TypeMemberKind::Method { .. }
    ));
    assert!(matches!(iface.members[3].kind, TypeMemberKind::Index(_)));
    match &iface.members[4].kind {
        TypeMemberKind::Property { name, .. } => {
            assert_eq!(name.as_text().as_deref(), Some("data-id"));
        }
        other => panic!("Expected property, got {other:?}"),
    }
}

#[test]
fn test_nested_generic_arguments_close_with_adjacent_greater_than() {
    let file = parse_ok("a.ts", "type A = Array<Array<Record<string, number>>>;");
    let Declaration::TypeAlias(alias) = declaration(&file.statements[0]) else {
        panic!("Expected type alias");
    };
    let TypeKind::Reference { name, type_args } = &alias.ty.kind else {
        panic!("Expected reference");
    };
    assert_eq!(name.text(), "Array");
    assert_eq!(type_args.len(), 1);
}

#[test]
fn test_conditional_and_mapped_types() {
    let file = parse_ok(
        "a.ts",
        r#"
type Unwrap<T> = T extends Promise<infer U> ? U : T;
type Partialize<T> = { -readonly [K in keyof T]+?: T[K] };
type Fn = T extends (...args: any[]) => infer R ? R : never;
"#,
    );
    let Declaration::TypeAlias(unwrap) = declaration(&file.statements[0]) else {
        panic!("Expected type alias");
    };
    assert_eq!(unwrap.type_params.len(), 1);
    assert!(matches!(unwrap.ty.kind, TypeKind::Conditional { .. }));

    let Declaration::TypeAlias(mapped) = declaration(&file.statements[1]) else {
        panic!("Expected type alias");
    };
    let TypeKind::Mapped(mapped) = &mapped.ty.kind else {
        panic!("Expected mapped type, got {:?}", mapped.ty.kind);
    };
    assert_eq!(mapped.type_param.name, "K");
    assert_eq!(mapped.readonly, MappedModifier::Remove);
    assert_eq!(mapped.optional, MappedModifier::Add);
    assert!(matches!(
        mapped.ty.as_ref().map(|t| &t.kind),
        Some(TypeKind::IndexedAccess { .. })
    ));

    let Declaration::TypeAlias(func) = declaration(&file.statements[2]) else {
        panic!("Expected type alias");
    };
    let TypeKind::Conditional { extends, .. } = &func.ty.kind else {
        panic!("Expected conditional");
    };
    assert!(matches!(extends.kind, TypeKind::Function(_)));
}

#[test]
fn test_function_component_with_destructured_props() {
    let file = parse_ok(
        "Button.tsx",
        r#"
import React from "react";

export default function Button({ label, size = "small", ...rest }: ButtonProps) {
  const handle = (e) => { if (a < b && c > d) { return /re/.test(x); } };
  return <button className={size === "small" ? "s" : "l"} {...rest}>{label}</button>;
}
"#,
    );
    assert_eq!(file.statements.len(), 2);
    let StatementKind::ExportDefault(ExportDefault::Declaration(Declaration::Function(func))) =
        &file.statements[1].kind
    else {
        panic!("Expected default function, got {:?}", file.statements[1].kind);
    };
    assert_eq!(func.name.as_ref().map(|n| n.name.as_str()), Some("Button"));
    assert_eq!(func.params.len(), 1);
    let BindingPattern::Object {
        properties, rest, ..
    } = &func.params[0].pattern
    else {
        panic!("Expected object pattern");
    };
    assert_eq!(properties.len(), 2);
    assert!(properties[1].default.is_some());
    assert_eq!(rest.as_ref().map(|r| r.name.as_str()), Some("rest"));
    assert!(func.body.is_some());
}

#[test]
fn test_arrow_component_with_jsx_body() {
    let file = parse_ok(
        "Card.tsx",
        r#"
export const Card = ({ title }: { title: string }) => (
  <div>
    <h1>{title}</h1>
    <>{items.map((i) => <Item key={i} />)}</>
  </div>
);
export const Other: React.FC<Props> = (props) => <span>{props.x > 1 ? "a" : "b"}</span>;
"#,
    );
    assert_eq!(file.statements.len(), 2);
    let init = single_initializer(&file.statements[0]);
    let ExprKind::Arrow(func) = &init.kind else {
        panic!("Expected arrow, got {:?}", init.kind);
    };
    assert_eq!(func.params.len(), 1);
    assert!(func.params[0].type_ann.is_some());
    let Declaration::Variable(other) = declaration(&file.statements[1]) else {
        panic!("Expected variable");
    };
    assert!(other.declarations[0].type_ann.is_some());
    assert!(matches!(
        other.declarations[0].init.as_ref().map(|e| &e.kind),
        Some(ExprKind::Arrow(_))
    ));
}

#[test]
fn test_generic_arrow_in_tsx() {
    let file = parse_ok(
        "List.tsx",
        "export const List = <T,>(props: ListProps<T>) => null;\nexport const Box = <T extends object>(p: T) => null;",
    );
    for statement in &file.statements {
        let init = single_initializer(statement);
        let ExprKind::Arrow(func) = &init.kind else {
            panic!("Expected arrow, got {:?}", init.kind);
        };
        assert_eq!(func.type_params.len(), 1);
    }
}

#[test]
fn test_story_object_and_template_bind() {
    let file = parse_ok(
        "Button.stories.tsx",
        r#"
import type { Meta, StoryObj } from "@storybook/react";
import { Button } from "./Button";

const meta = {
  title: "Example/Button",
  component: Button,
  args: { primary: false, count: -1, tags: ["a", `b`] },
} satisfies Meta<typeof Button>;
export default meta;

export const Primary: StoryObj<typeof meta> = { args: { primary: true } };
const Template = (args) => <Button {...args} />;
export const Secondary = Template.bind({});
Secondary.args = { label: "Second" };
"#,
    );
    let StatementKind::Import(import) = &file.statements[0].kind else {
        panic!("Expected import");
    };
    assert!(import.type_only);
    assert_eq!(import.named.len(), 2);
    assert_eq!(import.source, "@storybook/react");

    let meta = single_initializer(&file.statements[2]);
    let ExprKind::Satisfies { expr, .. } = &meta.kind else {
        panic!("Expected satisfies, got {:?}", meta.kind);
    };
    let ExprKind::Object(properties) = &expr.kind else {
        panic!("Expected object literal");
    };
    assert_eq!(properties.len(), 3);
    assert!(matches!(&properties[1], ObjectProperty::KeyValue { value, .. }
        if value.as_identifier() == Some("Button")));

    assert!(matches!(
        &file.statements[3].kind,
        StatementKind::ExportDefault(ExportDefault::Expression(e)) if e.as_identifier() == Some("meta")
    ));

    let secondary = single_initializer(&file.statements[6]);
    let ExprKind::Call { callee, args, .. } = &secondary.kind else {
        panic!("Expected call");
    };
    assert_eq!(callee.entity_text().as_deref(), Some("Template.bind"));
    assert_eq!(args.len(), 1);

    let StatementKind::Expression(assign) = &file.statements[7].kind else {
        panic!("Expected expression statement");
    };
    let ExprKind::Assign { op, target, value } = &assign.kind else {
        panic!("Expected assignment");
    };
    assert_eq!(op, "=");
    assert_eq!(target.entity_text().as_deref(), Some("Secondary.args"));
    assert!(matches!(value.kind, ExprKind::Object(_)));
}

#[test]
fn test_import_and_export_forms() {
    let file = parse_ok(
        "index.ts",
        r#"
import Default, * as ns from "./a";
import { type A, b as c, default as d } from "./b";
import "./side-effect";
import fs = require("fs");
export * from "./c";
export * as utils from "./d";
export { x as y, type Z } from "./e";
export { local };
export = Thing;
"#,
    );
    let kinds: Vec<_> = file.statements.iter().map(|s| &s.kind).collect();
    let StatementKind::Import(first) = kinds[0] else {
        panic!("Expected import");
    };
    assert_eq!(first.default.as_ref().map(|d| d.name.as_str()), Some("Default"));
    assert_eq!(first.namespace.as_ref().map(|n| n.name.as_str()), Some("ns"));

    let StatementKind::Import(second) = kinds[1] else {
        panic!("Expected import");
    };
    assert!(second.named[0].type_only);
    assert_eq!(second.named[1].imported, "b");
    assert_eq!(second.named[1].local.name, "c");
    assert_eq!(second.named[2].imported, "default");

    assert!(matches!(kinds[2], StatementKind::Import(i) if i.source == "./side-effect"));
    assert!(matches!(kinds[3], StatementKind::Import(i) if i.is_require && i.source == "fs"));
    assert!(matches!(kinds[4], StatementKind::ExportAll(e) if e.alias.is_none()));
    assert!(matches!(kinds[5], StatementKind::ExportAll(e)
        if e.alias.as_ref().map(|a| a.name.as_str()) == Some("utils")));
    let StatementKind::ExportNamed(named) = kinds[6] else {
        panic!("Expected named export");
    };
    assert_eq!(named.source.as_deref(), Some("./e"));
    assert_eq!(named.specifiers[0].local.name, "x");
    assert_eq!(named.specifiers[0].exported.name, "y");
    assert!(named.specifiers[1].type_only);
    assert!(matches!(kinds[7], StatementKind::ExportNamed(n) if n.source.is_none()));
    assert!(matches!(kinds[8], StatementKind::ExportAssignment(_)));
}

#[test]
fn test_negative_and_separated_literal_types() {
    let file = parse_ok("ids.ts", "type Id = -1 | -2n | 1_000;");
    let Declaration::TypeAlias(alias) = declaration(&file.statements[0]) else {
        panic!("Expected type alias");
    };
    let TypeKind::Union(members) = &alias.ty.kind else {
        panic!("Expected union, got {:?}", alias.ty.kind);
    };
    assert_eq!(members.len(), 3);
    assert!(matches!(
        &members[0].kind,
        TypeKind::Literal(LiteralType::Number(n)) if *n == -1.0
    ));
    assert!(matches!(
        &members[1].kind,
        TypeKind::Literal(LiteralType::BigInt(text)) if text.starts_with("-2")
    ));
    assert!(matches!(
        &members[2].kind,
        TypeKind::Literal(LiteralType::Number(n)) if *n == 1000.0
    ));
}

#[test]
fn test_enum_and_namespace() {
    let file = parse_ok(
        "a.ts",
        r#"
export const enum Color { Red = "red", Green = 2, Blue }
declare namespace JSX { interface Element {} }
declare module "virtual" { export const x: number; }
declare global { interface Window { app: App } }
"#,
    );
    let Declaration::Enum(color) = declaration(&file.statements[0]) else {
        panic!("Expected enum");
    };
    assert!(color.is_const);
    assert_eq!(color.members.len(), 3);

    let StatementKind::Declaration { declare, decl, .. } = &file.statements[1].kind else {
        panic!("Expected declaration");
    };
    assert!(*declare);
    let Declaration::Module(module) = decl else {
        panic!("Expected module");
    };
    assert!(matches!(&module.name, ModuleName::Identifier(n) if n.text() == "JSX"));
    assert_eq!(module.body.as_ref().map(Vec::len), Some(1));

    let Declaration::Module(virtual_module) = declaration(&file.statements[2]) else {
        panic!("Expected module");
    };
    assert!(matches!(&virtual_module.name, ModuleName::String(s, _) if s == "virtual"));
    let Declaration::Module(global) = declaration(&file.statements[3]) else {
        panic!("Expected module");
    };
    assert!(matches!(global.name, ModuleName::Global));
}

#[test]
fn test_class_component_members() {
    let file = parse_ok(
        "Counter.tsx",
        r#"
export class Counter extends React.Component<CounterProps, State> {
  static defaultProps = { step: 1 };
  private count = 0;
  state: State = { n: 0 };
  constructor(props: CounterProps) { super(props); }
  render() { return <div>{this.state.n}</div>; }
  get value(): number { return 1; }
}
"#,
    );
    let Declaration::Class(class) = declaration(&file.statements[0]) else {
        panic!("Expected class");
    };
    let heritage = class.extends.as_ref().expect("extends clause");
    assert_eq!(
        heritage.expression.entity_text().as_deref(),
        Some("React.Component")
    );
    assert_eq!(heritage.type_args.len(), 2);
    assert_eq!(class.members.len(), 6);
    assert!(class.members[0].modifiers.contains(Modifiers::STATIC));
    assert!(class.members[1].modifiers.contains(Modifiers::PRIVATE));
    assert!(matches!(class.members[3].kind, ClassMemberKind::Constructor(_)));
}

#[test]
fn test_expressions_with_operators() {
    let file = parse_ok(
        "a.ts",
        r#"
const a = x >> 1 >= y ? -z : !w;
const b = obj?.prop?.[0]?.(arg) ?? new Map<string, number>([["k", 1]]);
const c = <const>["a", "b"];
let d = 1; d >>= 2;
const e = f<string>(g) as unknown as T;
const h = async () => { await g(); };
const i = function named() {};
"#,
    );
    let a = single_initializer(&file.statements[0]);
    let ExprKind::Conditional { test, .. } = &a.kind else {
        panic!("Expected conditional, got {:?}", a.kind);
    };
    let ExprKind::Binary { op, left, .. } = &test.kind else {
        panic!("Expected binary");
    };
    assert_eq!(op, ">=");
    assert!(matches!(&left.kind, ExprKind::Binary { op, .. } if op == ">>"));

    let b = single_initializer(&file.statements[1]);
    assert!(matches!(&b.kind, ExprKind::Binary { op, .. } if op == "??"));

    assert!(matches!(
        single_initializer(&file.statements[2]).kind,
        ExprKind::TypeAssertion { .. }
    ));

    let StatementKind::Expression(shift) = &file.statements[4].kind else {
        panic!("Expected expression statement");
    };
    assert!(matches!(&shift.kind, ExprKind::Assign { op, .. } if op == ">>="));

    let e = single_initializer(&file.statements[5]);
    let ExprKind::As { expr, .. } = &e.kind else {
        panic!("Expected as");
    };
    assert!(matches!(&expr.kind, ExprKind::As { expr, .. }
        if matches!(&expr.kind, ExprKind::Call { type_args, .. } if type_args.len() == 1)));

    assert!(matches!(
        &single_initializer(&file.statements[6]).kind,
        ExprKind::Arrow(func) if func.is_async
    ));
    assert!(matches!(
        &single_initializer(&file.statements[7]).kind,
        ExprKind::Function(func) if func.name.as_ref().is_some_and(|n| n.name == "named")
    ));
}

#[test]
fn test_less_than_comparison_is_not_type_arguments() {
    let file = parse_ok("a.ts", "const ok = a < b;\nconst also = a < b && c > d;");
    assert!(matches!(
        &single_initializer(&file.statements[0]).kind,
        ExprKind::Binary { op, .. } if op == "<"
    ));
    assert!(matches!(
        &single_initializer(&file.statements[1]).kind,
        ExprKind::Binary { op, .. } if op == "&&"
    ));
}

#[test]
fn test_control_flow_is_skipped() {
    let file = parse_ok(
        "a.ts",
        r#"
if (x) { const inner = 1; } else { other(); }
for (const k of list) run(k);
try { a(); } catch (e) { b(); } finally { c(); }
export const after = 1;
"#,
    );
    let last = file.statements.last().expect("statement");
    assert!(matches!(
        &last.kind,
        StatementKind::Declaration { exported: true, .. }
    ));
}

#[test]
fn test_syntax_errors_are_reported_and_recovered() {
    let (file, diagnostics) = parse(
        "broken.ts",
        "export interface A { x: }\nexport const ok = 1;",
    );
    assert!(!diagnostics.is_empty());
    assert!(diagnostics.iter().all(|d| d.file == "broken.ts"));
    assert!(file.statements.iter().any(|s| matches!(
        &s.kind,
        StatementKind::Declaration { decl: Declaration::Variable(_), .. }
    )));
}

#[test]
fn test_deep_nesting_is_bounded() {
    // Debug-build frames are large; give the recursion the headroom the
    // analyzer's worker threads get.
    let handle = std::thread::Builder::new()
        .stack_size(32 * 1024 * 1024)
        .spawn(|| {
            let depth = 2000;
            let source = format!(
                "type Deep = {}string{};\nexport const ok = 1;",
                "Array<".repeat(depth),
                ">".repeat(depth)
            );
            let (file, diagnostics) = parse("deep.ts", &source);
            assert!(
                diagnostics
                    .iter()
                    .any(|d| d.message_text.contains("too deeply"))
            );
            assert!(!file.statements.is_empty());
        })
        .expect("spawn parser thread");
    handle.join().expect("parser thread panicked");
}

#[test]
fn test_overloads_and_declare_function() {
    let file = parse_ok(
        "a.ts",
        r#"
export function pick(a: string): string;
export function pick(a: number): number;
export function pick(a: any) { return a; }
export declare function ambient(x: number): void;
"#,
    );
    assert_eq!(file.statements.len(), 4);
    let Declaration::Function(first) = declaration(&file.statements[0]) else {
        panic!("Expected function");
    };
    assert!(first.body.is_none());
    assert!(first.return_type.is_some());
}

#[test]
fn test_script_block_without_jsx_allows_type_assertions() {
    let mut parser =
        ParserState::new("Comp.vue".to_string(), "const x = <number>y;".to_string()).with_jsx(false);
    let file = parser.parse_source_file();
    assert!(parser.get_diagnostics().is_empty());
    let init = single_initializer(&file.statements[0]);
    assert!(matches!(init.kind, ExprKind::TypeAssertion { .. }));
}

#[test]
fn standalone_object_expression() {
    let parsed = crate::parse_expression("{ label: \"x\", onClick: () => {} }").unwrap();
    let ExprKind::Object(properties) = &parsed.expr.skip_outer().kind else {
        panic!("expected object, got {:?}", parsed.expr);
    };
    assert_eq!(properties.len(), 2);
    let ObjectProperty::KeyValue { value, .. } = &properties[1] else {
        panic!("expected key/value");
    };
    assert_eq!(parsed.source_of(value), "() => {}");
}

#[test]
fn standalone_expression_rejects_statements() {
    assert!(crate::parse_expression("1; 2").is_err());
    assert!(crate::parse_expression("{ a: }").is_err());
}
