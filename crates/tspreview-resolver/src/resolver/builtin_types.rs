//! Application of builtin library types (`Partial<T>`, `Record<K, V>`, ...).

use tspreview_checker::oracle::{Binding, resolve_entity};
use tspreview_syntax::ast::{TypeKind, TypeNode};
use tspreview_types::{Fields, LiteralValue, ValueType};

use super::operators::{literal_keys, without_undefined};
use super::queries::function_of;
use super::{Context, TypeGraphResolver};
use crate::builtins::{Builtin, apply_string_intrinsic};

impl TypeGraphResolver<'_> {
    pub(crate) fn apply_builtin(
        &mut self,
        cx: &Context,
        builtin: Builtin,
        type_args: &[TypeNode],
    ) -> ValueType {
        if builtin.takes_syntax() {
            return self.apply_syntax_builtin(cx, builtin, type_args.first());
        }

        let args: Vec<ValueType> = type_args
            .iter()
            .map(|arg| self.resolve_node(cx, arg))
            .collect();
        let arg = |index: usize| args.get(index).cloned().unwrap_or(ValueType::Unknown);

        match builtin {
            Builtin::Array => ValueType::array(arg(0)),
            Builtin::Set => ValueType::set(arg(0)),
            Builtin::Map => ValueType::map(arg(0), arg(1)),
            Builtin::Promise => ValueType::promise(arg(0)),
            Builtin::Record => {
                let key = arg(0);
                let value = arg(1);
                match literal_keys(&key) {
                    Some(keys) => ValueType::object(
                        keys.into_iter().map(|key| (key, value.clone())).collect(),
                    ),
                    None => ValueType::record(key, value),
                }
            }
            Builtin::Partial => self.map_fields(&arg(0), |field| {
                ValueType::optional(field.into_required())
            }),
            Builtin::Required => self.map_fields(&arg(0), |field| {
                if field.is_optional() {
                    without_undefined(field.into_required())
                } else {
                    field
                }
            }),
            Builtin::Readonly => arg(0),
            Builtin::Pick | Builtin::Omit => {
                let source = self.dereference(&arg(0));
                let Some(fields) = source.fields() else {
                    return source;
                };
                let Some(keys) = literal_keys(&arg(1)) else {
                    return ValueType::object(fields.clone());
                };
                let keep = builtin == Builtin::Pick;
                let picked: Fields = fields
                    .iter()
                    .filter(|(name, _)| keys.contains(*name) == keep)
                    .map(|(name, ty)| (name.clone(), ty.clone()))
                    .collect();
                ValueType::object(picked)
            }
            Builtin::Exclude | Builtin::Extract => {
                let target = arg(1);
                let members = match arg(0) {
                    ValueType::Union { types } => types,
                    other => vec![other],
                };
                let keep_assignable = builtin == Builtin::Extract;
                ValueType::union(members.into_iter().filter(|member| {
                    match self.is_assignable(member, &target) {
                        Some(assignable) => assignable == keep_assignable,
                        // Undecidable members are kept by both.
                        None => true,
                    }
                }))
            }
            Builtin::NonNullable => match arg(0).into_required() {
                ValueType::Union { types } => ValueType::union(types.into_iter().filter(|member| {
                    !matches!(member, ValueType::Null | ValueType::Undefined | ValueType::Void)
                })),
                ValueType::Null | ValueType::Undefined => ValueType::Never,
                other => other,
            },
            Builtin::Awaited => {
                let mut ty = arg(0);
                loop {
                    match ty {
                        ValueType::Promise { ty: inner } => ty = *inner,
                        other => break other,
                    }
                }
            }
            Builtin::Uppercase | Builtin::Lowercase | Builtin::Capitalize | Builtin::Uncapitalize => {
                string_intrinsic(builtin, arg(0))
            }
            Builtin::String => ValueType::String,
            Builtin::Number => ValueType::Number,
            Builtin::Boolean => ValueType::Boolean,
            Builtin::Object => ValueType::empty_object(),
            Builtin::Function => ValueType::Function,
            Builtin::Opaque => ValueType::Unknown,
            Builtin::ReturnType
            | Builtin::Parameters
            | Builtin::InstanceType
            | Builtin::ComponentProps => ValueType::Unknown,
        }
    }

    /// Builtins that look at a declaration rather than a type:
    /// `ReturnType<typeof f>`, `ComponentProps<typeof Button>`.
    fn apply_syntax_builtin(
        &mut self,
        cx: &Context,
        builtin: Builtin,
        arg: Option<&TypeNode>,
    ) -> ValueType {
        let Some(arg) = arg.map(TypeNode::unparenthesized) else {
            return ValueType::Unknown;
        };
        match (&arg.kind, builtin) {
            (TypeKind::Function(function), Builtin::ReturnType) => {
                self.resolve_node(cx, &function.return_type)
            }
            (TypeKind::Function(function), Builtin::Parameters) => {
                let params: Vec<ValueType> = function
                    .params
                    .iter()
                    .map(|param| {
                        let ty = match &param.type_ann {
                            Some(ty) => self.resolve_node(cx, ty),
                            None => ValueType::Unknown,
                        };
                        if param.optional {
                            ValueType::optional(ty)
                        } else {
                            ty
                        }
                    })
                    .collect();
                ValueType::tuple(params)
            }
            (TypeKind::Literal(_), Builtin::ComponentProps) => ValueType::empty_object(),
            (TypeKind::TypeQuery { name, .. }, _) => {
                let segments: Vec<&str> = name.segments.iter().map(|s| s.name.as_str()).collect();
                let Some(resolution) = resolve_entity(self.oracle, &cx.file, cx.scope, &segments)
                else {
                    self.warn(cx, format_args!("cannot find value `{}`", name.text()));
                    return ValueType::Unknown;
                };
                if builtin == Builtin::ComponentProps {
                    return match self.component_props(resolution, &name.text()) {
                        Ok(props) => props,
                        Err(err) => {
                            self.warn(cx, err);
                            ValueType::Unknown
                        }
                    };
                }
                let Binding::Symbol(symbol) = resolution.binding else {
                    return ValueType::Unknown;
                };
                if builtin == Builtin::InstanceType {
                    return self
                        .resolve_symbol_type(&symbol, Vec::new())
                        .unwrap_or(ValueType::Unknown);
                }
                let Some(function) = function_of(&symbol) else {
                    return ValueType::Unknown;
                };
                let mut fn_cx = Context::for_symbol(&symbol);
                self.bind_type_params(&mut fn_cx, &function.type_params, &[]);
                if builtin == Builtin::ReturnType {
                    return match &function.return_type {
                        Some(ty) => self.resolve_node(&fn_cx, ty),
                        None => ValueType::Unknown,
                    };
                }
                let params: Vec<ValueType> = function
                    .params
                    .iter()
                    .map(|param| {
                        let ty = match &param.type_ann {
                            Some(ty) => self.resolve_node(&fn_cx, ty),
                            None => ValueType::Unknown,
                        };
                        if param.optional || param.default.is_some() {
                            ValueType::optional(ty)
                        } else {
                            ty
                        }
                    })
                    .collect();
                ValueType::tuple(params)
            }
            _ => ValueType::Unknown,
        }
    }

    /// Apply `f` to every field of an object, distributing over unions.
    fn map_fields(&self, ty: &ValueType, f: impl Fn(ValueType) -> ValueType + Copy) -> ValueType {
        match self.dereference(ty) {
            ValueType::Object { fields } => ValueType::object(
                fields
                    .into_iter()
                    .map(|(name, field)| (name, f(field)))
                    .collect(),
            ),
            ValueType::Union { types } => {
                ValueType::union(types.iter().map(|member| self.map_fields(member, f)))
            }
            other => other,
        }
    }
}

fn string_intrinsic(builtin: Builtin, ty: ValueType) -> ValueType {
    match ty {
        ValueType::Literal {
            value: LiteralValue::String(value),
        } => ValueType::string_literal(apply_string_intrinsic(builtin, &value)),
        ValueType::Union { types } => ValueType::union(
            types
                .into_iter()
                .map(|member| string_intrinsic(builtin, member)),
        ),
        _ => ValueType::String,
    }
}
