//! Type-graph resolution.
//!
//! [`TypeGraphResolver`] walks a type annotation through the oracle and
//! produces a finite [`ValueType`] tree plus the [`CollectedTypes`] table its
//! `name` references point into.
//!
//! Named types (aliases, interfaces, classes, enums) are expanded inline and
//! memoized per call. An identity (declaration plus type arguments) that is
//! re-entered while it is still being expanded is a cycle: the inner
//! occurrence becomes a `name`, and once the outer expansion finishes it is
//! registered in the collected table and returned as a `name` as well.
//!
//! Resolution never fails. Anything that cannot be resolved becomes
//! `unknown` and a warning.

mod builtin_types;
mod members;
mod operators;
mod queries;
mod references;

pub(crate) use queries::Inference;

use std::fmt::Display;
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use tracing::{trace, warn};
use tspreview_checker::reader::relative_display_path;
use tspreview_checker::{BoundFile, ScopeId, Symbol, TypeOracle};
use tspreview_common::{RecursionGuard, RecursionProfile, RecursionResult};
use tspreview_syntax::ast::{KeywordType, LiteralType, TupleElement, TypeKind, TypeNode, TypeParam, TypeOperatorKind};
use tspreview_types::{CollectedTypes, ValueType};

use crate::overrides::SpecialTypeOverrides;

/// Type parameter bindings in effect while resolving a node.
pub type TypeEnv = FxHashMap<String, ValueType>;

/// A type annotation together with the file that contains it, the scope it
/// is evaluated in and the active type-parameter environment.
#[derive(Clone, Copy)]
pub struct TypeHandle<'a> {
    pub file: &'a Arc<BoundFile>,
    pub scope: ScopeId,
    pub node: &'a TypeNode,
    pub env: Option<&'a TypeEnv>,
}

impl<'a> TypeHandle<'a> {
    pub fn new(file: &'a Arc<BoundFile>, node: &'a TypeNode) -> Self {
        TypeHandle {
            file,
            scope: ScopeId::ROOT,
            node,
            env: None,
        }
    }

    pub fn in_scope(mut self, scope: ScopeId) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_env(mut self, env: &'a TypeEnv) -> Self {
        self.env = Some(env);
        self
    }
}

/// Result of one resolution: the type, the named types it references and
/// what could not be resolved on the way.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolvedType {
    #[serde(rename = "type")]
    pub ty: ValueType,
    pub collected: CollectedTypes,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Where a type node is evaluated.
#[derive(Clone)]
pub(crate) struct Context {
    pub(crate) file: Arc<BoundFile>,
    pub(crate) scope: ScopeId,
    pub(crate) env: TypeEnv,
}

impl Context {
    pub(crate) fn new(file: Arc<BoundFile>, scope: ScopeId) -> Self {
        Context {
            file,
            scope,
            env: TypeEnv::default(),
        }
    }

    pub(crate) fn for_symbol(symbol: &Symbol) -> Self {
        Context::new(symbol.file.clone(), symbol.scope)
    }

    /// A copy of this context with one more type binding.
    pub(crate) fn bind(&self, name: &str, ty: ValueType) -> Self {
        let mut cx = self.clone();
        cx.env.insert(name.to_string(), ty);
        cx
    }
}

pub struct TypeGraphResolver<'a> {
    pub(crate) oracle: &'a dyn TypeOracle,
    pub(crate) overrides: &'a SpecialTypeOverrides,
    guard: RecursionGuard<String>,
    /// Finished expansions by collected name; cyclic ones map to their `name`.
    memo: FxHashMap<String, ValueType>,
    cyclic: FxHashSet<String>,
    pub(crate) collected: CollectedTypes,
    warnings: Vec<String>,
}

impl<'a> TypeGraphResolver<'a> {
    pub fn new(oracle: &'a dyn TypeOracle, overrides: &'a SpecialTypeOverrides) -> Self {
        TypeGraphResolver {
            oracle,
            overrides,
            guard: RecursionGuard::with_profile(RecursionProfile::TypeResolution),
            memo: FxHashMap::default(),
            cyclic: FxHashSet::default(),
            collected: CollectedTypes::new(),
            warnings: Vec::new(),
        }
    }

    /// Resolve one type annotation into a fresh graph.
    pub fn resolve_type(&mut self, handle: TypeHandle<'_>) -> ResolvedType {
        let mut cx = Context::new(handle.file.clone(), handle.scope);
        if let Some(env) = handle.env {
            cx.env = env.clone();
        }
        let ty = self.resolve_node(&cx, handle.node);
        self.finish(ty)
    }

    /// Declared or inferred type of a value declared in `file`.
    pub fn resolve_value(&mut self, file: &Arc<BoundFile>, name: &str) -> ResolvedType {
        let cx = Context::new(file.clone(), ScopeId::ROOT);
        let ty = match tspreview_checker::oracle::resolve_identifier(self.oracle, file, ScopeId::ROOT, name) {
            Some(resolution) => self.value_type_of(&cx, resolution),
            None => {
                self.warn(&cx, format_args!("cannot find value `{name}`"));
                ValueType::Unknown
            }
        };
        self.finish(ty)
    }

    /// Package the accumulated graph and reset for the next call.
    pub(crate) fn finish(&mut self, ty: ValueType) -> ResolvedType {
        let mut collected = std::mem::take(&mut self.collected);
        collected.retain_reachable(&ty);
        self.memo.clear();
        self.cyclic.clear();
        self.guard.reset();
        ResolvedType {
            ty,
            collected,
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    pub(crate) fn warn(&mut self, cx: &Context, message: impl Display) {
        let path = relative_display_path(self.oracle.root_dir(), &cx.file.path);
        let warning = format!("{path}: {message}");
        warn!("{warning}");
        self.warnings.push(warning);
    }

    // =========================================================================
    // Nodes
    // =========================================================================

    pub(crate) fn resolve_node(&mut self, cx: &Context, node: &TypeNode) -> ValueType {
        match &node.kind {
            TypeKind::Keyword(keyword) => keyword_type(*keyword),
            TypeKind::This => cx.env.get("this").cloned().unwrap_or(ValueType::Unknown),
            TypeKind::Literal(literal) => literal_type(literal),
            TypeKind::TemplateLiteral => ValueType::String,
            TypeKind::Reference { name, type_args } => self.resolve_reference(cx, name, type_args),
            TypeKind::Array(element) => ValueType::array(self.resolve_node(cx, element)),
            TypeKind::Tuple(elements) => self.resolve_tuple(cx, elements),
            TypeKind::TypeLiteral(members) => self.object_from_members(cx, members),
            TypeKind::Union(types) => {
                let members: Vec<ValueType> =
                    types.iter().map(|ty| self.resolve_node(cx, ty)).collect();
                ValueType::union(members)
            }
            TypeKind::Intersection(types) => {
                let members: Vec<ValueType> = types
                    .iter()
                    .map(|ty| {
                        let resolved = self.resolve_node(cx, ty);
                        self.dereference(&resolved)
                    })
                    .collect();
                ValueType::intersection(members)
            }
            TypeKind::Function(_) => ValueType::Function,
            TypeKind::Paren(inner) => self.resolve_node(cx, inner),
            TypeKind::TypeOperator { op, ty } => match op {
                TypeOperatorKind::KeyOf => {
                    let operand = self.resolve_node(cx, ty);
                    self.keyof(&operand)
                }
                TypeOperatorKind::Readonly => self.resolve_node(cx, ty),
                TypeOperatorKind::Unique => ValueType::Unknown,
            },
            TypeKind::IndexedAccess { object, index } => {
                let object = self.resolve_node(cx, object);
                let index = self.resolve_node(cx, index);
                self.indexed_access(cx, &object, &index)
            }
            TypeKind::TypeQuery { name, .. } => self.resolve_type_query(cx, name),
            TypeKind::Conditional {
                check,
                extends,
                true_type,
                false_type,
            } => self.resolve_conditional(cx, check, extends, true_type, false_type),
            TypeKind::Infer { .. } => ValueType::Unknown,
            TypeKind::Mapped(mapped) => self.resolve_mapped(cx, mapped),
            TypeKind::Import {
                module,
                qualifier,
                type_args,
                is_typeof,
            } => self.resolve_import_type(cx, module, qualifier.as_ref(), type_args, *is_typeof),
            TypeKind::Predicate { .. } => ValueType::Boolean,
            TypeKind::Error => {
                self.warn(cx, "unparseable type annotation");
                ValueType::Unknown
            }
        }
    }

    fn resolve_tuple(&mut self, cx: &Context, elements: &[TupleElement]) -> ValueType {
        let items = elements
            .iter()
            .map(|element| {
                let ty = self.resolve_node(cx, &element.ty);
                if element.rest {
                    match self.dereference(&ty) {
                        ValueType::Array { items } => *items,
                        other => other,
                    }
                } else if element.optional {
                    ValueType::optional(ty)
                } else {
                    ty
                }
            })
            .collect();
        ValueType::tuple(items)
    }

    /// Bind declared type parameters: explicit arguments first, then
    /// defaults, then constraints, then `unknown`.
    pub(crate) fn bind_type_params(
        &mut self,
        cx: &mut Context,
        params: &[TypeParam],
        args: &[ValueType],
    ) {
        for (index, param) in params.iter().enumerate() {
            let value = match args.get(index) {
                Some(arg) => arg.clone(),
                None => match (&param.default, &param.constraint) {
                    (Some(default), _) => self.resolve_node(cx, default),
                    (None, Some(constraint)) => self.resolve_node(cx, constraint),
                    (None, None) => ValueType::Unknown,
                },
            };
            cx.env.insert(param.name.name.clone(), value);
        }
    }

    // =========================================================================
    // Named types
    // =========================================================================

    /// Collected-table name of a declaration instantiated with `args`.
    pub(crate) fn collected_name(&self, symbol: &Symbol, args: &[ValueType]) -> String {
        let path = relative_display_path(self.oracle.root_dir(), &symbol.file.path);
        let mut name = format!("{path}:{}", symbol.qualified_name());
        if !args.is_empty() {
            let rendered: Vec<String> = args.iter().map(ToString::to_string).collect();
            name.push('<');
            name.push_str(&rendered.join(", "));
            name.push('>');
        }
        name
    }

    /// Expand a named type under the cycle guard.
    pub(crate) fn expand_named(
        &mut self,
        key: String,
        expand: impl FnOnce(&mut Self) -> ValueType,
    ) -> ValueType {
        if let Some(done) = self.memo.get(&key) {
            return done.clone();
        }
        match self.guard.enter(key.clone()) {
            RecursionResult::Entered => {}
            RecursionResult::Cycle => {
                trace!(name = %key, "cyclic type");
                self.cyclic.insert(key.clone());
                return ValueType::name(key);
            }
            RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => {
                let message = format!("type `{key}` is too deeply nested");
                self.warnings.push(message.clone());
                warn!("{message}");
                return ValueType::Unknown;
            }
        }

        let expanded = expand(self);
        self.guard.leave(&key);

        let result = if self.cyclic.contains(&key) {
            self.collected.insert(key.clone(), expanded);
            ValueType::name(key.clone())
        } else {
            expanded
        };
        self.memo.insert(key, result.clone());
        result
    }

    /// Follow `name` references through the collected table.
    pub(crate) fn dereference(&self, ty: &ValueType) -> ValueType {
        let mut current = ty;
        for _ in 0..8 {
            match current {
                ValueType::Name { name } => match self.collected.get(name) {
                    Some(next) => current = next,
                    None => break,
                },
                _ => break,
            }
        }
        current.clone()
    }
}

fn keyword_type(keyword: KeywordType) -> ValueType {
    match keyword {
        KeywordType::Any => ValueType::Any,
        KeywordType::Unknown => ValueType::Unknown,
        KeywordType::Never => ValueType::Never,
        KeywordType::Void => ValueType::Void,
        KeywordType::Null => ValueType::Null,
        KeywordType::Undefined => ValueType::Undefined,
        KeywordType::String => ValueType::String,
        KeywordType::Number => ValueType::Number,
        KeywordType::Boolean => ValueType::Boolean,
        KeywordType::Object => ValueType::empty_object(),
        KeywordType::Symbol | KeywordType::BigInt | KeywordType::Intrinsic => ValueType::Unknown,
    }
}

fn literal_type(literal: &LiteralType) -> ValueType {
    match literal {
        LiteralType::String(value) => ValueType::string_literal(value.clone()),
        LiteralType::Number(value) => ValueType::number_literal(*value),
        LiteralType::Boolean(value) => ValueType::boolean_literal(*value),
        LiteralType::BigInt(_) => ValueType::Unknown,
    }
}

#[cfg(test)]
#[path = "../../tests/resolver_tests.rs"]
mod resolver_tests;
