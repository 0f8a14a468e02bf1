//! Props extraction for components.
//!
//! A component's props are the type of its first parameter, taken from the
//! annotation on the parameter, from the component's own type annotation
//! (`FC<P>`), from a wrapper's type arguments (`forwardRef<R, P>`) or from
//! the `extends` clause of a class component. Single-file components declare
//! props through compiler macros instead (`defineProps<T>()`, `$props()`).

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, trace};
use tspreview_checker::oracle::{Binding, Resolution, module_export, resolve_identifier};
use tspreview_checker::{BoundFile, DeclView, ModuleRef, ScopeId, TypeOracle};
use tspreview_syntax::ast::{
    ArrayElement, BindingPattern, ClassDecl, ClassMemberKind, Declaration, ExportDefault,
    ExprKind, Expression, Function, ObjectProperty, StatementKind, TypeKind, TypeNode, VarKind,
};
use tspreview_types::{Fields, ValueType};

use crate::overrides::SpecialTypeOverrides;
use crate::resolver::{Context, Inference, ResolvedType, TypeGraphResolver};

/// Wrapper chains deeper than this are not followed (`memo(forwardRef(...))`
/// through re-assigned identifiers).
const MAX_WRAPPER_DEPTH: u32 = 8;

/// Component type annotations whose first type argument is the props type.
const COMPONENT_TYPES: &[&str] = &[
    "FC",
    "FunctionComponent",
    "VFC",
    "Component",
    "ParentComponent",
    "VoidComponent",
    "FunctionalComponent",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropsError {
    #[error("component `{name}` not found")]
    NotFound { name: String },
    #[error("`{name}` is not a component")]
    NotAComponent { name: String },
}

/// Props of the component exported (or declared) as `component_name` in `file`.
pub fn extract_component_props(
    oracle: &dyn TypeOracle,
    overrides: &SpecialTypeOverrides,
    file: &Arc<BoundFile>,
    component_name: &str,
) -> Result<ResolvedType, PropsError> {
    let resolution = module_export(oracle, &ModuleRef::root(file.clone()), component_name)
        .or_else(|| resolve_identifier(oracle, file, ScopeId::ROOT, component_name))
        .ok_or_else(|| PropsError::NotFound {
            name: component_name.to_string(),
        })?;
    let mut resolver = TypeGraphResolver::new(oracle, overrides);
    let props = resolver.component_props(resolution, component_name)?;
    debug!(component = component_name, "extracted props");
    Ok(resolver.finish(props))
}

/// Props of a Vue single-file component: the type argument of
/// `defineProps<T>()`, or its runtime object declaration.
pub fn extract_vue_props(
    oracle: &dyn TypeOracle,
    overrides: &SpecialTypeOverrides,
    file: &Arc<BoundFile>,
) -> Result<ResolvedType, PropsError> {
    let mut resolver = TypeGraphResolver::new(oracle, overrides);
    let cx = Context::new(file.clone(), ScopeId::ROOT);
    let mut props = ValueType::empty_object();
    for expr in top_level_expressions(file) {
        if let Some(found) = resolver.vue_props(&cx, expr) {
            props = found;
            break;
        }
    }
    Ok(resolver.finish(props))
}

/// Props of a Svelte component: `export let` declarations (Svelte 4) or the
/// `$props()` destructuring (Svelte 5).
pub fn extract_svelte_props(
    oracle: &dyn TypeOracle,
    overrides: &SpecialTypeOverrides,
    file: &Arc<BoundFile>,
) -> Result<ResolvedType, PropsError> {
    let mut resolver = TypeGraphResolver::new(oracle, overrides);
    let cx = Context::new(file.clone(), ScopeId::ROOT);
    let mut exported = Fields::new();

    for statement in &file.source.statements {
        let StatementKind::Declaration {
            exported: is_exported,
            decl: Declaration::Variable(vars),
            ..
        } = &statement.kind
        else {
            continue;
        };
        for declarator in &vars.declarations {
            let is_props_rune = declarator.init.as_ref().is_some_and(|init| {
                matches!(&init.skip_outer().kind, ExprKind::Call { callee, .. } if callee.as_identifier() == Some("$props"))
            });
            if is_props_rune {
                let props = resolver.props_of_binding(
                    &cx,
                    &declarator.name,
                    declarator.type_ann.as_ref(),
                );
                return Ok(resolver.finish(props));
            }
            if !*is_exported || vars.kind == VarKind::Const {
                continue;
            }
            let Some(ident) = declarator.name.as_identifier() else {
                continue;
            };
            let ty = match (&declarator.type_ann, &declarator.init) {
                (Some(ty), _) => resolver.resolve_node(&cx, ty),
                (None, Some(init)) => resolver.infer_expression(&cx, init, Inference::Widened),
                (None, None) => ValueType::Any,
            };
            let ty = if declarator.init.is_some() {
                ValueType::optional(ty)
            } else {
                ty
            };
            exported.insert(ident.name.clone(), ty);
        }
    }
    Ok(resolver.finish(ValueType::object(exported)))
}

impl TypeGraphResolver<'_> {
    /// Props of the component a resolution names.
    pub(crate) fn component_props(
        &mut self,
        resolution: Resolution,
        name: &str,
    ) -> Result<ValueType, PropsError> {
        self.props_of_resolution(resolution, name, 0)
    }

    fn props_of_resolution(
        &mut self,
        resolution: Resolution,
        name: &str,
        depth: u32,
    ) -> Result<ValueType, PropsError> {
        let not_a_component = || PropsError::NotAComponent {
            name: name.to_string(),
        };
        if depth > MAX_WRAPPER_DEPTH {
            return Err(not_a_component());
        }
        let symbol = match resolution.binding {
            Binding::Symbol(symbol) => symbol,
            Binding::Module(_) => return Err(not_a_component()),
            Binding::Unresolved { .. } => {
                return Err(PropsError::NotFound {
                    name: name.to_string(),
                });
            }
        };
        let cx = Context::for_symbol(&symbol);
        for (_, view) in symbol.declarations() {
            match view {
                DeclView::Function(function) => return Ok(self.props_of_function(&cx, function, None)),
                DeclView::Class(class) => return Ok(self.props_of_class(&cx, class)),
                DeclView::Variable { declarator, .. } => {
                    let Some(init) = &declarator.init else {
                        return Err(not_a_component());
                    };
                    return self.props_of_expression(
                        &cx,
                        init,
                        declarator.type_ann.as_ref(),
                        name,
                        depth,
                    );
                }
                DeclView::DefaultExpression(expr) => {
                    return self.props_of_expression(&cx, expr, None, name, depth);
                }
                _ => {}
            }
        }
        Err(not_a_component())
    }

    fn props_of_expression(
        &mut self,
        cx: &Context,
        expr: &Expression,
        annotation: Option<&TypeNode>,
        name: &str,
        depth: u32,
    ) -> Result<ValueType, PropsError> {
        match &expr.skip_outer().kind {
            ExprKind::Arrow(function) | ExprKind::Function(function) => {
                Ok(self.props_of_function(cx, function, annotation))
            }
            ExprKind::Class(class) => Ok(self.props_of_class(cx, class)),
            ExprKind::Identifier(target) => {
                let resolution = resolve_identifier(self.oracle, &cx.file, cx.scope, target)
                    .ok_or_else(|| PropsError::NotFound {
                        name: target.clone(),
                    })?;
                self.props_of_resolution(resolution, name, depth + 1)
            }
            ExprKind::Call {
                callee,
                type_args,
                args,
                ..
            } => {
                let callee_name = callee.entity_text().unwrap_or_default();
                let wrapper = callee_name.rsplit('.').next().unwrap_or_default();
                trace!(wrapper, "component wrapper");
                if wrapper == "forwardRef"
                    && let Some(props) = type_args.get(1)
                {
                    return Ok(self.resolve_node(cx, props));
                }
                if !matches!(wrapper, "forwardRef" | "memo" | "observer") {
                    return Err(PropsError::NotAComponent {
                        name: name.to_string(),
                    });
                }
                match args.first() {
                    Some(ArrayElement::Expr(inner)) => {
                        self.props_of_expression(cx, inner, annotation, name, depth + 1)
                    }
                    _ => Err(PropsError::NotAComponent {
                        name: name.to_string(),
                    }),
                }
            }
            _ => Err(PropsError::NotAComponent {
                name: name.to_string(),
            }),
        }
    }

    fn props_of_function(
        &mut self,
        cx: &Context,
        function: &Function,
        annotation: Option<&TypeNode>,
    ) -> ValueType {
        let mut cx = cx.clone();
        self.bind_type_params(&mut cx, &function.type_params, &[]);
        match function.params.first() {
            Some(param) => {
                let annotation = param.type_ann.as_ref().or(annotation.and_then(component_type_arg));
                self.props_of_binding(&cx, &param.pattern, annotation)
            }
            None => match annotation.and_then(component_type_arg) {
                Some(props) => self.resolve_node(&cx, props),
                None => ValueType::empty_object(),
            },
        }
    }

    /// Props bound by a parameter or a `$props()` destructuring.
    fn props_of_binding(
        &mut self,
        cx: &Context,
        pattern: &BindingPattern,
        annotation: Option<&TypeNode>,
    ) -> ValueType {
        match (annotation, pattern) {
            (
                Some(annotation),
                BindingPattern::Object {
                    properties,
                    rest: None,
                    ..
                },
            ) => {
                let declared = self.resolve_node(cx, annotation);
                let keys: Vec<String> = properties.iter().filter_map(|p| p.key.as_text()).collect();
                self.prune_fields(&declared, &keys, 0)
            }
            (Some(annotation), _) => self.resolve_node(cx, annotation),
            (None, BindingPattern::Object { properties, .. }) => {
                let mut fields = Fields::new();
                for property in properties {
                    let Some(key) = property.key.as_text() else {
                        continue;
                    };
                    let ty = match &property.default {
                        Some(default) => self.infer_expression(cx, default, Inference::Widened),
                        None => ValueType::Unknown,
                    };
                    fields.insert(key, ValueType::optional(ty));
                }
                ValueType::object(fields)
            }
            (None, _) => ValueType::empty_object(),
        }
    }

    /// `ty` with every object reachable through unions, intersections and
    /// named aliases narrowed to `keys`. Other shapes are kept whole.
    fn prune_fields(&self, ty: &ValueType, keys: &[String], depth: u32) -> ValueType {
        if depth > MAX_WRAPPER_DEPTH {
            return ty.clone();
        }
        match ty {
            ValueType::Object { fields } => ValueType::object(
                fields
                    .iter()
                    .filter(|(name, _)| keys.contains(name))
                    .map(|(name, field)| (name.clone(), field.clone()))
                    .collect(),
            ),
            ValueType::Union { types } => ValueType::union(
                types
                    .iter()
                    .map(|member| self.prune_fields(member, keys, depth + 1)),
            ),
            ValueType::Intersection { types } => ValueType::intersection(
                types
                    .iter()
                    .map(|member| self.prune_fields(member, keys, depth + 1)),
            ),
            ValueType::Name { .. } => match self.dereference(ty) {
                ValueType::Name { .. } => ty.clone(),
                target => self.prune_fields(&target, keys, depth + 1),
            },
            _ => ty.clone(),
        }
    }

    fn props_of_class(&mut self, cx: &Context, class: &ClassDecl) -> ValueType {
        let mut cx = cx.clone();
        self.bind_type_params(&mut cx, &class.type_params, &[]);
        if let Some(props) = class
            .extends
            .as_ref()
            .and_then(|heritage| heritage.type_args.first())
        {
            return self.resolve_node(&cx, props);
        }
        let constructor_props = class.members.iter().find_map(|member| match &member.kind {
            ClassMemberKind::Constructor(constructor) => constructor.params.first()?.type_ann.as_ref(),
            _ => None,
        });
        match constructor_props {
            Some(props) => self.resolve_node(&cx, props),
            None => ValueType::empty_object(),
        }
    }

    /// `defineProps<T>()`, `withDefaults(defineProps<T>(), {...})` or
    /// `defineProps({ ... })` inside `expr`.
    fn vue_props(&mut self, cx: &Context, expr: &Expression) -> Option<ValueType> {
        let ExprKind::Call {
            callee,
            type_args,
            args,
            ..
        } = &expr.skip_outer().kind
        else {
            return None;
        };
        match callee.as_identifier()? {
            "defineProps" => {
                if let Some(props) = type_args.first() {
                    return Some(self.resolve_node(cx, props));
                }
                match args.first() {
                    Some(ArrayElement::Expr(declaration)) => {
                        Some(self.vue_runtime_props(cx, declaration))
                    }
                    _ => Some(ValueType::empty_object()),
                }
            }
            "withDefaults" => {
                let mut args = args.iter().filter_map(|arg| match arg {
                    ArrayElement::Expr(expr) => Some(expr),
                    _ => None,
                });
                let props = self.vue_props(cx, args.next()?)?;
                let defaulted: Vec<String> = match args.next().map(|e| &e.skip_outer().kind) {
                    Some(ExprKind::Object(properties)) => properties
                        .iter()
                        .filter_map(|property| match property {
                            ObjectProperty::KeyValue { key, .. }
                            | ObjectProperty::Method { key, .. } => key.as_text(),
                            ObjectProperty::Shorthand(ident) => Some(ident.name.clone()),
                            _ => None,
                        })
                        .collect(),
                    _ => Vec::new(),
                };
                Some(match self.dereference(&props) {
                    ValueType::Object { fields } => ValueType::object(
                        fields
                            .into_iter()
                            .map(|(name, ty)| {
                                let ty = if defaulted.contains(&name) {
                                    ValueType::optional(ty)
                                } else {
                                    ty
                                };
                                (name, ty)
                            })
                            .collect(),
                    ),
                    _ => props,
                })
            }
            _ => None,
        }
    }

    /// `defineProps({ title: String, count: { type: Number, required: true } })`.
    fn vue_runtime_props(&mut self, cx: &Context, declaration: &Expression) -> ValueType {
        let ExprKind::Object(properties) = &declaration.skip_outer().kind else {
            // `defineProps(["title"])`
            if let ExprKind::Array(names) = &declaration.skip_outer().kind {
                let fields = names
                    .iter()
                    .filter_map(|name| match name {
                        ArrayElement::Expr(expr) => match &expr.kind {
                            ExprKind::String(name) => {
                                Some((name.clone(), ValueType::optional(ValueType::Unknown)))
                            }
                            _ => None,
                        },
                        _ => None,
                    })
                    .collect();
                return ValueType::object(fields);
            }
            self.warn(cx, "unsupported defineProps declaration");
            return ValueType::empty_object();
        };
        let mut fields = Fields::new();
        for property in properties {
            let ObjectProperty::KeyValue { key, value } = property else {
                continue;
            };
            let Some(name) = key.as_text() else {
                continue;
            };
            let (ty, required) = match &value.skip_outer().kind {
                ExprKind::Object(options) => {
                    let mut ty = ValueType::Unknown;
                    let mut required = false;
                    for option in options {
                        if let ObjectProperty::KeyValue { key, value } = option {
                            match key.as_text().as_deref() {
                                Some("type") => ty = vue_constructor_type(cx, self, value),
                                Some("required") => {
                                    required = matches!(value.kind, ExprKind::Boolean(true));
                                }
                                _ => {}
                            }
                        }
                    }
                    (ty, required)
                }
                _ => (vue_constructor_type(cx, self, value), false),
            };
            let ty = if required { ty } else { ValueType::optional(ty) };
            fields.insert(name, ty);
        }
        ValueType::object(fields)
    }
}

/// Runtime prop constructor (`String`, `[String, Number]`, `Object as PropType<T>`).
fn vue_constructor_type(cx: &Context, resolver: &mut TypeGraphResolver<'_>, expr: &Expression) -> ValueType {
    if let ExprKind::As { ty, .. } = &expr.kind
        && let TypeKind::Reference { name, type_args } = &ty.kind
        && name.last() == "PropType"
        && let Some(inner) = type_args.first()
    {
        return resolver.resolve_node(cx, inner);
    }
    match &expr.skip_outer().kind {
        ExprKind::Identifier(name) => match name.as_str() {
            "String" => ValueType::String,
            "Number" => ValueType::Number,
            "Boolean" => ValueType::Boolean,
            "Array" => ValueType::array(ValueType::Unknown),
            "Object" => ValueType::empty_object(),
            "Function" => ValueType::Function,
            "Date" | "Symbol" => ValueType::Unknown,
            _ => ValueType::Unknown,
        },
        ExprKind::Array(constructors) => ValueType::union(constructors.iter().filter_map(|c| match c {
            ArrayElement::Expr(expr) => Some(vue_constructor_type(cx, resolver, expr)),
            _ => None,
        })),
        _ => ValueType::Unknown,
    }
}

/// `P` of a component annotation such as `React.FC<P>`.
fn component_type_arg(annotation: &TypeNode) -> Option<&TypeNode> {
    match &annotation.unparenthesized().kind {
        TypeKind::Reference { name, type_args } if COMPONENT_TYPES.contains(&name.last()) => {
            type_args.first()
        }
        _ => None,
    }
}

/// Top-level expressions of a script: expression statements, variable
/// initializers and `export default` expressions.
fn top_level_expressions(file: &BoundFile) -> Vec<&Expression> {
    let mut expressions = Vec::new();
    for statement in &file.source.statements {
        match &statement.kind {
            StatementKind::Expression(expr)
            | StatementKind::ExportDefault(ExportDefault::Expression(expr)) => expressions.push(expr),
            StatementKind::Declaration {
                decl: Declaration::Variable(vars),
                ..
            } => expressions.extend(vars.declarations.iter().filter_map(|d| d.init.as_ref())),
            _ => {}
        }
    }
    expressions
}

#[cfg(test)]
#[path = "../tests/props_tests.rs"]
mod props_tests;
