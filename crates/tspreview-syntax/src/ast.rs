//! Owned syntax tree for the declaration-level subset of TypeScript.
//!
//! Function and method bodies are not represented: the analyzer only needs
//! signatures, type annotations and the initializers of top-level bindings.
//! Expressions the analyzer never inspects are kept as [`ExprKind::Other`]
//! with their span so their source text stays recoverable.

use std::sync::Arc;

use bitflags::bitflags;
use smallvec::SmallVec;
use tspreview_common::ByteSpan;

// =============================================================================
// Source file
// =============================================================================

#[derive(Clone, Debug)]
pub struct SourceFile {
    pub file_name: String,
    pub text: Arc<str>,
    pub statements: Vec<Statement>,
    /// The file was parsed with JSX enabled.
    pub jsx: bool,
}

impl SourceFile {
    /// Source text covered by `span`.
    pub fn text_of(&self, span: ByteSpan) -> &str {
        span.slice(&self.text)
    }
}

// =============================================================================
// Names
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub span: ByteSpan,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: ByteSpan) -> Self {
        Ident {
            name: name.into(),
            span,
        }
    }
}

/// A possibly-qualified name: `Props`, `React.FC`, `A.B.C`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityName {
    pub segments: SmallVec<[Ident; 2]>,
    pub span: ByteSpan,
}

impl EntityName {
    pub fn simple(ident: Ident) -> Self {
        let span = ident.span;
        let mut segments = SmallVec::new();
        segments.push(ident);
        EntityName { segments, span }
    }

    /// Leftmost segment (`React` in `React.FC`).
    pub fn first(&self) -> &str {
        self.segments.first().map_or("", |s| s.name.as_str())
    }

    /// Rightmost segment (`FC` in `React.FC`).
    pub fn last(&self) -> &str {
        self.segments.last().map_or("", |s| s.name.as_str())
    }

    pub fn is_simple(&self) -> bool {
        self.segments.len() == 1
    }

    /// Dotted text of the name.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            out.push_str(&segment.name);
        }
        out
    }
}

#[derive(Clone, Debug)]
pub enum PropertyName {
    Ident(Ident),
    String(String, ByteSpan),
    Number(f64, ByteSpan),
    PrivateName(Ident),
    Computed(Box<Expression>),
}

impl PropertyName {
    /// Static key text, if the key is not computed.
    pub fn as_text(&self) -> Option<String> {
        match self {
            PropertyName::Ident(ident) => Some(ident.name.clone()),
            PropertyName::String(value, _) => Some(value.clone()),
            PropertyName::Number(value, _) => Some(format_number_key(*value)),
            PropertyName::PrivateName(_) | PropertyName::Computed(_) => None,
        }
    }

    pub fn span(&self) -> ByteSpan {
        match self {
            PropertyName::Ident(ident) | PropertyName::PrivateName(ident) => ident.span,
            PropertyName::String(_, span) | PropertyName::Number(_, span) => *span,
            PropertyName::Computed(expr) => expr.span,
        }
    }
}

/// Property-key text of a numeric key (`{ 1: x }` has key `"1"`).
pub fn format_number_key(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e21 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

bitflags! {
    /// Declaration and member modifiers.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Modifiers: u16 {
        const EXPORT = 1 << 0;
        const DEFAULT = 1 << 1;
        const DECLARE = 1 << 2;
        const CONST = 1 << 3;
        const ABSTRACT = 1 << 4;
        const ASYNC = 1 << 5;
        const STATIC = 1 << 6;
        const READONLY = 1 << 7;
        const PUBLIC = 1 << 8;
        const PRIVATE = 1 << 9;
        const PROTECTED = 1 << 10;
        const OVERRIDE = 1 << 11;
        const ACCESSOR = 1 << 12;
        const IN = 1 << 13;
        const OUT = 1 << 14;
    }
}

impl Modifiers {
    pub fn from_keyword(text: &str) -> Option<Modifiers> {
        Some(match text {
            "export" => Modifiers::EXPORT,
            "default" => Modifiers::DEFAULT,
            "declare" => Modifiers::DECLARE,
            "const" => Modifiers::CONST,
            "abstract" => Modifiers::ABSTRACT,
            "async" => Modifiers::ASYNC,
            "static" => Modifiers::STATIC,
            "readonly" => Modifiers::READONLY,
            "public" => Modifiers::PUBLIC,
            "private" => Modifiers::PRIVATE,
            "protected" => Modifiers::PROTECTED,
            "override" => Modifiers::OVERRIDE,
            "accessor" => Modifiers::ACCESSOR,
            "in" => Modifiers::IN,
            "out" => Modifiers::OUT,
            _ => return None,
        })
    }

    /// Members not visible on instances from outside the class.
    pub fn is_hidden(self) -> bool {
        self.intersects(Modifiers::PRIVATE | Modifiers::PROTECTED | Modifiers::STATIC)
    }
}

// =============================================================================
// Statements
// =============================================================================

#[derive(Clone, Debug)]
pub struct Statement {
    pub span: ByteSpan,
    pub kind: StatementKind,
}

#[derive(Clone, Debug)]
pub enum StatementKind {
    Import(ImportDecl),
    /// `export { a, b as c }` / `export { a } from "m"`.
    ExportNamed(ExportNamed),
    /// `export * from "m"` / `export * as ns from "m"`.
    ExportAll(ExportAll),
    ExportDefault(ExportDefault),
    /// `export = X`.
    ExportAssignment(Expression),
    Declaration {
        exported: bool,
        declare: bool,
        decl: Declaration,
    },
    Expression(Expression),
    /// Control flow, `import X = A.B`, `export as namespace X`, and anything
    /// else the analyzer has no use for.
    Other,
}

#[derive(Clone, Debug)]
pub struct ImportDecl {
    pub type_only: bool,
    pub default: Option<Ident>,
    pub namespace: Option<Ident>,
    pub named: Vec<ImportSpecifier>,
    pub source: String,
    /// `import X = require("m")`.
    pub is_require: bool,
}

#[derive(Clone, Debug)]
pub struct ImportSpecifier {
    /// Name exported by the module (`a` in `{ a as b }`).
    pub imported: String,
    pub local: Ident,
    pub type_only: bool,
}

#[derive(Clone, Debug)]
pub struct ExportNamed {
    pub specifiers: Vec<ExportSpecifier>,
    pub source: Option<String>,
    pub type_only: bool,
}

#[derive(Clone, Debug)]
pub struct ExportSpecifier {
    /// Local name, or the name in `source` for re-exports.
    pub local: Ident,
    pub exported: Ident,
    pub type_only: bool,
}

#[derive(Clone, Debug)]
pub struct ExportAll {
    pub alias: Option<Ident>,
    pub source: String,
    pub type_only: bool,
}

#[derive(Clone, Debug)]
pub enum ExportDefault {
    Expression(Expression),
    Declaration(Declaration),
}

#[derive(Clone, Debug)]
pub enum Declaration {
    Variable(VariableStatement),
    Function(Function),
    Class(ClassDecl),
    TypeAlias(TypeAliasDecl),
    Interface(InterfaceDecl),
    Enum(EnumDecl),
    Module(ModuleDecl),
}

impl Declaration {
    /// Name bound by a non-variable declaration.
    pub fn name(&self) -> Option<&Ident> {
        match self {
            Declaration::Variable(_) => None,
            Declaration::Function(func) => func.name.as_ref(),
            Declaration::Class(class) => class.name.as_ref(),
            Declaration::TypeAlias(alias) => Some(&alias.name),
            Declaration::Interface(iface) => Some(&iface.name),
            Declaration::Enum(decl) => Some(&decl.name),
            Declaration::Module(module) => match &module.name {
                ModuleName::Identifier(name) => name.segments.first(),
                ModuleName::String(..) | ModuleName::Global => None,
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VarKind {
    Var,
    Let,
    Const,
    Using,
}

#[derive(Clone, Debug)]
pub struct VariableStatement {
    pub kind: VarKind,
    pub declarations: Vec<VariableDeclarator>,
}

#[derive(Clone, Debug)]
pub struct VariableDeclarator {
    pub span: ByteSpan,
    pub name: BindingPattern,
    pub type_ann: Option<TypeNode>,
    pub init: Option<Expression>,
}

/// Function declaration, function expression, arrow, method or constructor.
#[derive(Clone, Debug)]
pub struct Function {
    pub span: ByteSpan,
    pub name: Option<Ident>,
    pub is_async: bool,
    pub is_generator: bool,
    pub is_arrow: bool,
    pub type_params: Vec<TypeParam>,
    pub params: Vec<Param>,
    pub return_type: Option<TypeNode>,
    /// `None` for overload signatures and ambient declarations.
    pub body: Option<FunctionBody>,
}

#[derive(Clone, Debug)]
pub struct FunctionBody {
    pub span: ByteSpan,
    /// Concise arrow body (`=> expr`); block bodies are skipped.
    pub expression: Option<Box<Expression>>,
}

#[derive(Clone, Debug)]
pub struct Param {
    pub span: ByteSpan,
    pub pattern: BindingPattern,
    pub optional: bool,
    pub rest: bool,
    pub type_ann: Option<TypeNode>,
    pub default: Option<Expression>,
    /// Constructor parameter property modifiers (`public x: T`).
    pub modifiers: Modifiers,
}

#[derive(Clone, Debug)]
pub enum BindingPattern {
    Identifier(Ident),
    Object {
        span: ByteSpan,
        properties: Vec<ObjectBindingProperty>,
        rest: Option<Ident>,
    },
    Array {
        span: ByteSpan,
        elements: Vec<Option<ArrayBindingElement>>,
        rest: Option<Box<BindingPattern>>,
    },
}

impl BindingPattern {
    pub fn span(&self) -> ByteSpan {
        match self {
            BindingPattern::Identifier(ident) => ident.span,
            BindingPattern::Object { span, .. } | BindingPattern::Array { span, .. } => *span,
        }
    }

    pub fn as_identifier(&self) -> Option<&Ident> {
        match self {
            BindingPattern::Identifier(ident) => Some(ident),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ObjectBindingProperty {
    pub key: PropertyName,
    /// Binding target; equal to the key for shorthand properties.
    pub value: BindingPattern,
    pub default: Option<Expression>,
}

#[derive(Clone, Debug)]
pub struct ArrayBindingElement {
    pub pattern: BindingPattern,
    pub default: Option<Expression>,
}

#[derive(Clone, Debug)]
pub struct TypeParam {
    pub span: ByteSpan,
    pub name: Ident,
    pub constraint: Option<TypeNode>,
    pub default: Option<TypeNode>,
    pub is_const: bool,
}

#[derive(Clone, Debug)]
pub struct ClassDecl {
    pub span: ByteSpan,
    pub name: Option<Ident>,
    pub type_params: Vec<TypeParam>,
    pub extends: Option<HeritageClause>,
    pub implements: Vec<TypeNode>,
    pub members: Vec<ClassMember>,
    pub is_abstract: bool,
}

/// `extends Base<Args>`; the base is an arbitrary expression.
#[derive(Clone, Debug)]
pub struct HeritageClause {
    pub expression: Expression,
    pub type_args: Vec<TypeNode>,
}

#[derive(Clone, Debug)]
pub struct ClassMember {
    pub span: ByteSpan,
    pub modifiers: Modifiers,
    pub kind: ClassMemberKind,
}

#[derive(Clone, Debug)]
pub enum ClassMemberKind {
    Property {
        name: PropertyName,
        optional: bool,
        type_ann: Option<TypeNode>,
        init: Option<Expression>,
    },
    Method {
        name: PropertyName,
        optional: bool,
        func: Function,
    },
    Constructor(Function),
    GetAccessor {
        name: PropertyName,
        return_type: Option<TypeNode>,
    },
    SetAccessor {
        name: PropertyName,
        param_type: Option<TypeNode>,
    },
    Index(IndexSignature),
    StaticBlock,
}

#[derive(Clone, Debug)]
pub struct TypeAliasDecl {
    pub name: Ident,
    pub type_params: Vec<TypeParam>,
    pub ty: TypeNode,
}

#[derive(Clone, Debug)]
pub struct InterfaceDecl {
    pub name: Ident,
    pub type_params: Vec<TypeParam>,
    pub extends: Vec<TypeNode>,
    pub members: Vec<TypeMember>,
}

#[derive(Clone, Debug)]
pub struct EnumDecl {
    pub name: Ident,
    pub is_const: bool,
    pub members: Vec<EnumMember>,
}

#[derive(Clone, Debug)]
pub struct EnumMember {
    pub span: ByteSpan,
    pub name: PropertyName,
    pub init: Option<Expression>,
}

#[derive(Clone, Debug)]
pub enum ModuleName {
    /// `namespace A.B { }`.
    Identifier(EntityName),
    /// `declare module "m" { }`.
    String(String, ByteSpan),
    /// `declare global { }`.
    Global,
}

#[derive(Clone, Debug)]
pub struct ModuleDecl {
    pub name: ModuleName,
    /// `None` for shorthand ambient modules (`declare module "m";`).
    pub body: Option<Vec<Statement>>,
}

// =============================================================================
// Types
// =============================================================================

#[derive(Clone, Debug)]
pub struct TypeNode {
    pub span: ByteSpan,
    pub kind: TypeKind,
}

impl TypeNode {
    pub fn new(span: ByteSpan, kind: TypeKind) -> Self {
        TypeNode { span, kind }
    }

    /// Strip any number of parentheses.
    pub fn unparenthesized(&self) -> &TypeNode {
        let mut node = self;
        while let TypeKind::Paren(inner) = &node.kind {
            node = inner;
        }
        node
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeywordType {
    Any,
    Unknown,
    Never,
    Void,
    Null,
    Undefined,
    String,
    Number,
    Boolean,
    Object,
    Symbol,
    BigInt,
    Intrinsic,
}

impl KeywordType {
    pub fn from_text(text: &str) -> Option<KeywordType> {
        Some(match text {
            "any" => KeywordType::Any,
            "unknown" => KeywordType::Unknown,
            "never" => KeywordType::Never,
            "void" => KeywordType::Void,
            "null" => KeywordType::Null,
            "undefined" => KeywordType::Undefined,
            "string" => KeywordType::String,
            "number" => KeywordType::Number,
            "boolean" => KeywordType::Boolean,
            "object" => KeywordType::Object,
            "symbol" => KeywordType::Symbol,
            "bigint" => KeywordType::BigInt,
            "intrinsic" => KeywordType::Intrinsic,
            _ => return None,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum LiteralType {
    String(String),
    Number(f64),
    Boolean(bool),
    BigInt(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeOperatorKind {
    KeyOf,
    Unique,
    Readonly,
}

/// `+`/`-` prefix on a mapped type's `readonly` or `?`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MappedModifier {
    #[default]
    None,
    Add,
    Remove,
}

#[derive(Clone, Debug)]
pub enum TypeKind {
    Keyword(KeywordType),
    This,
    Literal(LiteralType),
    /// `` `prefix-${string}` ``.
    TemplateLiteral,
    Reference {
        name: EntityName,
        type_args: Vec<TypeNode>,
    },
    Array(Box<TypeNode>),
    Tuple(Vec<TupleElement>),
    TypeLiteral(Vec<TypeMember>),
    Union(Vec<TypeNode>),
    Intersection(Vec<TypeNode>),
    Function(Box<FunctionType>),
    Paren(Box<TypeNode>),
    TypeOperator {
        op: TypeOperatorKind,
        ty: Box<TypeNode>,
    },
    IndexedAccess {
        object: Box<TypeNode>,
        index: Box<TypeNode>,
    },
    /// `typeof x.y`.
    TypeQuery {
        name: EntityName,
        type_args: Vec<TypeNode>,
    },
    Conditional {
        check: Box<TypeNode>,
        extends: Box<TypeNode>,
        true_type: Box<TypeNode>,
        false_type: Box<TypeNode>,
    },
    Infer {
        name: Ident,
        constraint: Option<Box<TypeNode>>,
    },
    Mapped(Box<MappedType>),
    /// `import("m").A.B<T>`.
    Import {
        module: String,
        qualifier: Option<EntityName>,
        type_args: Vec<TypeNode>,
        is_typeof: bool,
    },
    /// `x is T` / `asserts x is T` / `asserts x`.
    Predicate {
        asserts: bool,
        ty: Option<Box<TypeNode>>,
    },
    /// Placeholder produced by error recovery.
    Error,
}

#[derive(Clone, Debug)]
pub struct TupleElement {
    pub name: Option<Ident>,
    pub ty: TypeNode,
    pub optional: bool,
    pub rest: bool,
}

#[derive(Clone, Debug)]
pub struct FunctionType {
    pub type_params: Vec<TypeParam>,
    pub params: Vec<Param>,
    pub return_type: TypeNode,
    pub is_constructor: bool,
}

#[derive(Clone, Debug)]
pub struct MappedType {
    pub type_param: Ident,
    pub constraint: TypeNode,
    /// `as` clause.
    pub name_type: Option<TypeNode>,
    pub optional: MappedModifier,
    pub readonly: MappedModifier,
    pub ty: Option<TypeNode>,
}

#[derive(Clone, Debug)]
pub struct Signature {
    pub type_params: Vec<TypeParam>,
    pub params: Vec<Param>,
    pub return_type: Option<TypeNode>,
}

#[derive(Clone, Debug)]
pub struct IndexSignature {
    pub key_name: Ident,
    pub key_type: TypeNode,
    pub ty: Option<TypeNode>,
    pub readonly: bool,
}

#[derive(Clone, Debug)]
pub struct TypeMember {
    pub span: ByteSpan,
    pub kind: TypeMemberKind,
}

#[derive(Clone, Debug)]
pub enum TypeMemberKind {
    Property {
        name: PropertyName,
        optional: bool,
        readonly: bool,
        ty: Option<TypeNode>,
    },
    Method {
        name: PropertyName,
        optional: bool,
        signature: Signature,
    },
    Call(Signature),
    Construct(Signature),
    Index(IndexSignature),
    GetAccessor {
        name: PropertyName,
        ty: Option<TypeNode>,
    },
    SetAccessor {
        name: PropertyName,
        ty: Option<TypeNode>,
    },
}

// =============================================================================
// Expressions
// =============================================================================

#[derive(Clone, Debug)]
pub struct Expression {
    pub span: ByteSpan,
    pub kind: ExprKind,
}

impl Expression {
    pub fn new(span: ByteSpan, kind: ExprKind) -> Self {
        Expression { span, kind }
    }

    /// Strip parentheses, `as`/`satisfies` casts and non-null assertions.
    pub fn skip_outer(&self) -> &Expression {
        let mut expr = self;
        loop {
            match &expr.kind {
                ExprKind::Paren(inner)
                | ExprKind::NonNull(inner)
                | ExprKind::As { expr: inner, .. }
                | ExprKind::Satisfies { expr: inner, .. }
                | ExprKind::TypeAssertion { expr: inner, .. } => expr = inner,
                _ => return expr,
            }
        }
    }

    pub fn as_identifier(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Identifier(name) => Some(name),
            _ => None,
        }
    }

    /// Dotted name of an identifier/member chain (`React.memo`).
    pub fn entity_text(&self) -> Option<String> {
        match &self.kind {
            ExprKind::Identifier(name) => Some(name.clone()),
            ExprKind::Member {
                object, property, ..
            } => {
                let mut text = object.entity_text()?;
                text.push('.');
                text.push_str(&property.name);
                Some(text)
            }
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Minus,
    Plus,
    Not,
    BitNot,
    TypeOf,
    Void,
    Delete,
    Await,
}

#[derive(Clone, Debug)]
pub enum ArrayElement {
    Expr(Expression),
    Spread(Expression),
    Hole,
}

#[derive(Clone, Debug)]
pub enum ObjectProperty {
    KeyValue {
        key: PropertyName,
        value: Expression,
    },
    Shorthand(Ident),
    Spread(Expression),
    Method {
        key: PropertyName,
        func: Box<Function>,
    },
    Getter {
        key: PropertyName,
        span: ByteSpan,
    },
    Setter {
        key: PropertyName,
        span: ByteSpan,
    },
}

#[derive(Clone, Debug)]
pub enum ExprKind {
    Identifier(String),
    This,
    Super,
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    BigInt(String),
    /// Template without substitutions; the cooked text.
    NoSubstitutionTemplate(String),
    /// Template with substitutions.
    Template,
    Regex,
    Array(Vec<ArrayElement>),
    Object(Vec<ObjectProperty>),
    Function(Box<Function>),
    Arrow(Box<Function>),
    Class(Box<ClassDecl>),
    Call {
        callee: Box<Expression>,
        type_args: Vec<TypeNode>,
        args: Vec<ArrayElement>,
        optional: bool,
    },
    New {
        callee: Box<Expression>,
        type_args: Vec<TypeNode>,
        args: Vec<ArrayElement>,
    },
    TaggedTemplate(Box<Expression>),
    Member {
        object: Box<Expression>,
        property: Ident,
        optional: bool,
    },
    Index {
        object: Box<Expression>,
        index: Box<Expression>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
    },
    Update(Box<Expression>),
    Binary {
        op: String,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Conditional {
        test: Box<Expression>,
        consequent: Box<Expression>,
        alternate: Box<Expression>,
    },
    Assign {
        op: String,
        target: Box<Expression>,
        value: Box<Expression>,
    },
    Sequence(Vec<Expression>),
    Paren(Box<Expression>),
    As {
        expr: Box<Expression>,
        ty: TypeNode,
    },
    Satisfies {
        expr: Box<Expression>,
        ty: TypeNode,
    },
    TypeAssertion {
        ty: TypeNode,
        expr: Box<Expression>,
    },
    NonNull(Box<Expression>),
    /// `<div>...</div>`, kept opaque.
    Jsx,
    /// `import.meta`, `new.target`, `import("m")`, `yield x`, ...
    Other,
}
