//! Type references: type parameters, overrides, builtins and declarations.

use indexmap::IndexMap;
use tspreview_checker::oracle::{
    Binding, Resolution, lookup_local, member_of, module_export, resolve_entity,
};
use tspreview_checker::{DeclView, ModuleRef, Symbol};
use tspreview_syntax::ast::{
    ClassDecl, EntityName, EnumDecl, ExprKind, Expression, InterfaceDecl, TypeNode, UnaryOp,
};
use tspreview_types::{EnumValue, ValueType};

use super::members::ObjectBuilder;
use super::{Context, TypeGraphResolver};
use crate::builtins;

impl TypeGraphResolver<'_> {
    pub(crate) fn resolve_reference(
        &mut self,
        cx: &Context,
        name: &EntityName,
        type_args: &[TypeNode],
    ) -> ValueType {
        if name.is_simple()
            && let Some(bound) = cx.env.get(name.first())
        {
            return bound.clone();
        }

        let text = name.text();
        // Global builtins apply unless the name is declared or imported locally.
        if lookup_local(&cx.file, cx.scope, name.first()).is_none()
            && let Some(builtin) = builtins::lookup(&text)
        {
            return self.apply_builtin(cx, builtin, type_args);
        }

        let segments: Vec<&str> = name.segments.iter().map(|s| s.name.as_str()).collect();
        let resolution = resolve_entity(self.oracle, &cx.file, cx.scope, &segments);
        let fully_qualified = match &resolution {
            Some(resolution) => resolution.fully_qualified_name.clone(),
            // Undeclared names are globals from an unloaded library.
            None => Some(text.clone()),
        };

        if let Some(fqn) = &fully_qualified {
            if let Some(builtin) = builtins::lookup_library(fqn) {
                return self.apply_builtin(cx, builtin, type_args);
            }
            if let Some(ty) = self.apply_override(cx, fqn, type_args) {
                return ty;
            }
        }

        match resolution {
            Some(resolution) => self.resolve_binding(cx, resolution, type_args, &text),
            None => {
                self.warn(cx, format_args!("cannot find type `{text}`"));
                ValueType::Unknown
            }
        }
    }

    /// Override registered for `fqn` (or, for `JSX.*` globals, for the
    /// configured JSX namespace module), applied to the resolved arguments.
    pub(crate) fn apply_override(
        &mut self,
        cx: &Context,
        fqn: &str,
        type_args: &[TypeNode],
    ) -> Option<ValueType> {
        let redirected = fqn.starts_with("JSX.").then(|| {
            self.oracle
                .options()
                .jsx_namespace_module()
                .map(|module| format!("{module}.{fqn}"))
        });
        let entry = redirected
            .flatten()
            .and_then(|name| self.overrides.get(&name))
            .or_else(|| self.overrides.get(fqn))?
            .clone();
        let args: Vec<ValueType> = type_args
            .iter()
            .map(|arg| {
                let resolved = self.resolve_node(cx, arg);
                self.dereference(&resolved)
            })
            .collect();
        Some(entry.apply(&args))
    }

    fn resolve_binding(
        &mut self,
        cx: &Context,
        resolution: Resolution,
        type_args: &[TypeNode],
        text: &str,
    ) -> ValueType {
        match resolution.binding {
            Binding::Unresolved { specifier } => {
                self.warn(
                    cx,
                    format_args!("cannot resolve module `{specifier}` for type `{text}`"),
                );
                ValueType::Unknown
            }
            Binding::Module(_) => {
                self.warn(cx, format_args!("namespace `{text}` used as a type"));
                ValueType::Unknown
            }
            Binding::Symbol(symbol) => {
                if let Some(member) = &resolution.member {
                    return match enum_member_value(&symbol, member) {
                        Some(value) => ValueType::Literal {
                            value: value.into(),
                        },
                        None => {
                            self.warn(cx, format_args!("unknown enum member `{text}`"));
                            ValueType::Unknown
                        }
                    };
                }
                let args: Vec<ValueType> = type_args
                    .iter()
                    .map(|arg| self.resolve_node(cx, arg))
                    .collect();
                match self.resolve_symbol_type(&symbol, args) {
                    Some(ty) => ty,
                    None => {
                        self.warn(cx, format_args!("`{text}` is not a type"));
                        ValueType::Unknown
                    }
                }
            }
        }
    }

    /// `import("m").A.B<T>` and `typeof import("m")`.
    pub(crate) fn resolve_import_type(
        &mut self,
        cx: &Context,
        module: &str,
        qualifier: Option<&EntityName>,
        type_args: &[TypeNode],
        is_typeof: bool,
    ) -> ValueType {
        let Some(qualifier) = qualifier else {
            return ValueType::Unknown;
        };
        let fqn = if tspreview_checker::module_resolver::is_bare_specifier(module) {
            Some(format!("{module}.{}", qualifier.text()))
        } else {
            None
        };
        if !is_typeof
            && let Some(fqn) = &fqn
            && let Some(ty) = self.apply_override(cx, fqn, type_args)
        {
            return ty;
        }

        let Some(target) = self.oracle.resolve_module(module, &cx.file.path) else {
            self.warn(cx, format_args!("cannot resolve module `{module}`"));
            return ValueType::Unknown;
        };
        let Some(resolution) = resolve_in_module(self.oracle, &target, qualifier) else {
            self.warn(cx, format_args!("cannot find `{}` in `{module}`", qualifier.text()));
            return ValueType::Unknown;
        };
        if is_typeof {
            return self.value_type_of(cx, resolution);
        }
        self.resolve_binding(cx, resolution, type_args, &qualifier.text())
    }

    /// Type meaning of a symbol instantiated with `args`; `None` when the
    /// symbol only has value meaning.
    pub(crate) fn resolve_symbol_type(
        &mut self,
        symbol: &Symbol,
        args: Vec<ValueType>,
    ) -> Option<ValueType> {
        if !symbol.declarations().any(|(_, view)| view.is_type()) {
            return None;
        }
        let key = self.collected_name(symbol, &args);
        Some(self.expand_named(key, |this| this.expand_declarations(symbol, &args)))
    }

    fn expand_declarations(&mut self, symbol: &Symbol, args: &[ValueType]) -> ValueType {
        let mut interfaces: Vec<&InterfaceDecl> = Vec::new();
        let mut class: Option<&ClassDecl> = None;
        for (_, view) in symbol.declarations() {
            match view {
                DeclView::TypeAlias(alias) => {
                    let mut cx = Context::for_symbol(symbol);
                    self.bind_type_params(&mut cx, &alias.type_params, args);
                    return self.resolve_node(&cx, &alias.ty);
                }
                DeclView::Enum(decl) => {
                    return ValueType::Enum {
                        name: symbol.qualified_name(),
                        options: enum_options(decl),
                    };
                }
                DeclView::Interface(decl) => interfaces.push(decl),
                DeclView::Class(decl) => class = class.or(Some(decl)),
                _ => {}
            }
        }

        let mut cx = Context::for_symbol(symbol);
        let type_params = class
            .map(|class| class.type_params.as_slice())
            .into_iter()
            .chain(interfaces.iter().map(|decl| decl.type_params.as_slice()))
            .find(|params| !params.is_empty())
            .unwrap_or_default();
        self.bind_type_params(&mut cx, type_params, args);

        let mut builder = ObjectBuilder::default();
        if let Some(class) = class {
            self.add_class_members(&cx, &mut builder, class);
        }
        self.add_interfaces(&cx, &mut builder, &interfaces);
        builder.finish()
    }
}

/// Resolve a qualified name inside a module (`import("m").A.B`).
fn resolve_in_module(
    oracle: &dyn tspreview_checker::TypeOracle,
    module: &ModuleRef,
    name: &EntityName,
) -> Option<Resolution> {
    let (first, rest) = name.segments.split_first()?;
    let mut resolution = module_export(oracle, module, &first.name)?;
    for segment in rest {
        resolution = member_of(oracle, resolution, &segment.name)?;
    }
    Some(resolution)
}

/// Member values of an enum; members without initializers count up from
/// the previous numeric value.
pub(crate) fn enum_options(decl: &EnumDecl) -> IndexMap<String, EnumValue> {
    let mut options = IndexMap::new();
    let mut next = 0.0;
    for member in &decl.members {
        let Some(name) = member.name.as_text() else {
            continue;
        };
        let init = member.init.as_ref().map(|init| init.skip_outer());
        let value = match init.map(|init| (&init.kind, numeric_value(init))) {
            Some((_, Some(value))) => {
                next = value + 1.0;
                EnumValue::Number(value)
            }
            Some((ExprKind::String(value) | ExprKind::NoSubstitutionTemplate(value), _)) => {
                EnumValue::String(value.clone())
            }
            _ => {
                let value = next;
                next += 1.0;
                EnumValue::Number(value)
            }
        };
        options.insert(name, value);
    }
    options
}

/// `1`, `-1` and `+1`.
pub(crate) fn numeric_value(expr: &Expression) -> Option<f64> {
    match &expr.skip_outer().kind {
        ExprKind::Number(value) => Some(*value),
        ExprKind::Unary {
            op: UnaryOp::Minus,
            operand,
        } => numeric_value(operand).map(|value| -value),
        ExprKind::Unary {
            op: UnaryOp::Plus,
            operand,
        } => numeric_value(operand),
        _ => None,
    }
}

pub(crate) fn enum_member_value(symbol: &Symbol, member: &str) -> Option<EnumValue> {
    symbol.declarations().find_map(|(_, view)| match view {
        DeclView::Enum(decl) => enum_options(decl).shift_remove(member),
        _ => None,
    })
}
