//! Value-side types: `typeof` queries and inference from initializers.

use tspreview_checker::oracle::{Binding, Resolution, resolve_entity, resolve_identifier};
use tspreview_checker::{DeclView, Symbol};
use tspreview_syntax::ast::{
    ArrayElement, BindingPattern, EntityName, ExprKind, Expression, Function, ObjectProperty,
    TypeKind, TypeNode, UnaryOp, VarKind,
};
use tspreview_types::{Fields, ValueType};

use super::references::{enum_member_value, enum_options, numeric_value};
use super::{Context, TypeGraphResolver};

/// How literal an inferred type stays.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Inference {
    /// `let x = 1` and nested positions: `number`.
    Widened,
    /// `const x = 1`: the top-level literal is kept.
    Literal,
    /// `as const`: literals everywhere, arrays become tuples.
    Const,
}

impl Inference {
    fn nested(self) -> Inference {
        match self {
            Inference::Const => Inference::Const,
            Inference::Widened | Inference::Literal => Inference::Widened,
        }
    }

    fn keeps_literals(self) -> bool {
        !matches!(self, Inference::Widened)
    }
}

impl TypeGraphResolver<'_> {
    /// `typeof a.b.c`.
    pub(crate) fn resolve_type_query(&mut self, cx: &Context, name: &EntityName) -> ValueType {
        let segments: Vec<&str> = name.segments.iter().map(|s| s.name.as_str()).collect();
        if let Some(resolution) = resolve_entity(self.oracle, &cx.file, cx.scope, &segments) {
            return self.value_type_of(cx, resolution);
        }

        // `typeof config.theme`: the value of `config`, then its fields.
        let Some(resolution) = resolve_identifier(self.oracle, &cx.file, cx.scope, name.first())
        else {
            self.warn(cx, format_args!("cannot find value `{}`", name.first()));
            return ValueType::Unknown;
        };
        let mut ty = self.value_type_of(cx, resolution);
        for segment in &name.segments[1..] {
            let field = self
                .dereference(&ty)
                .fields()
                .and_then(|fields| fields.get(&segment.name))
                .cloned();
            ty = match field {
                Some(field) => field,
                None => {
                    self.warn(
                        cx,
                        format_args!("property `{}` does not exist on `{}`", segment.name, name.text()),
                    );
                    return ValueType::Unknown;
                }
            };
        }
        ty
    }

    /// Declared or inferred type of the value a resolution names.
    pub(crate) fn value_type_of(&mut self, cx: &Context, resolution: Resolution) -> ValueType {
        let symbol = match resolution.binding {
            Binding::Symbol(symbol) => symbol,
            Binding::Module(_) => return ValueType::Unknown,
            Binding::Unresolved { specifier } => {
                self.warn(cx, format_args!("cannot resolve module `{specifier}`"));
                return ValueType::Unknown;
            }
        };
        if let Some(member) = &resolution.member {
            return match enum_member_value(&symbol, member) {
                Some(value) => ValueType::Literal {
                    value: value.into(),
                },
                None => ValueType::Unknown,
            };
        }

        let key = format!("typeof:{}", symbol.identity());
        if !self.guard.enter(key.clone()).is_entered() {
            return ValueType::Unknown;
        }
        let ty = self.symbol_value_type(&symbol);
        self.guard.leave(&key);
        ty
    }

    fn symbol_value_type(&mut self, symbol: &Symbol) -> ValueType {
        let cx = Context::for_symbol(symbol);
        for (_, view) in symbol.declarations() {
            match view {
                DeclView::Variable { declarator, kind } => {
                    let mode = if kind == VarKind::Const {
                        Inference::Literal
                    } else {
                        Inference::Widened
                    };
                    let declared = match (&declarator.type_ann, &declarator.init) {
                        (Some(ty), _) => self.resolve_node(&cx, ty),
                        (None, Some(init)) => self.infer_expression(&cx, init, mode),
                        (None, None) => ValueType::Unknown,
                    };
                    if declarator.name.as_identifier().is_some() {
                        return declared;
                    }
                    let Some(path) = destructured_path(&declarator.name, &symbol.name) else {
                        return ValueType::Unknown;
                    };
                    let mut ty = declared;
                    for key in path {
                        ty = match self.dereference(&ty).fields().and_then(|f| f.get(key)) {
                            Some(field) => field.clone().into_required(),
                            None => return ValueType::Unknown,
                        };
                    }
                    return ty;
                }
                DeclView::Function(_) | DeclView::Class(_) => return ValueType::Function,
                DeclView::Enum(decl) => {
                    let fields: Fields = enum_options(decl)
                        .into_iter()
                        .map(|(name, value)| (name, ValueType::Literal { value: value.into() }))
                        .collect();
                    return ValueType::object(fields);
                }
                DeclView::DefaultExpression(expr) => {
                    return self.infer_expression(&cx, expr, Inference::Literal);
                }
                DeclView::Namespace(_) | DeclView::TypeAlias(_) | DeclView::Interface(_) => {}
            }
        }
        ValueType::Unknown
    }

    pub(crate) fn infer_expression(
        &mut self,
        cx: &Context,
        expr: &Expression,
        mode: Inference,
    ) -> ValueType {
        let nested = mode.nested();
        match &expr.kind {
            ExprKind::Paren(inner) | ExprKind::NonNull(inner) => {
                self.infer_expression(cx, inner, mode)
            }
            ExprKind::Satisfies { expr, .. } => self.infer_expression(cx, expr, mode),
            ExprKind::As { expr, ty } | ExprKind::TypeAssertion { ty, expr } => {
                if is_const_assertion(ty) {
                    self.infer_expression(cx, expr, Inference::Const)
                } else {
                    self.resolve_node(cx, ty)
                }
            }
            ExprKind::Null => ValueType::Null,
            ExprKind::Boolean(value) => {
                widen(ValueType::boolean_literal(*value), ValueType::Boolean, mode)
            }
            ExprKind::Number(value) => {
                widen(ValueType::number_literal(*value), ValueType::Number, mode)
            }
            ExprKind::String(value) | ExprKind::NoSubstitutionTemplate(value) => {
                widen(ValueType::string_literal(value.clone()), ValueType::String, mode)
            }
            ExprKind::Template => ValueType::String,
            ExprKind::Identifier(name) => match name.as_str() {
                "undefined" => ValueType::Undefined,
                "NaN" | "Infinity" => ValueType::Number,
                _ => match resolve_identifier(self.oracle, &cx.file, cx.scope, name) {
                    Some(resolution) => self.value_type_of(cx, resolution),
                    None => ValueType::Unknown,
                },
            },
            ExprKind::Array(elements) => {
                let items: Vec<ValueType> = elements
                    .iter()
                    .map(|element| match element {
                        ArrayElement::Expr(item) => self.infer_expression(cx, item, nested),
                        ArrayElement::Spread(item) => {
                            match self.infer_expression(cx, item, nested) {
                                ValueType::Array { items } => *items,
                                _ => ValueType::Unknown,
                            }
                        }
                        ArrayElement::Hole => ValueType::Undefined,
                    })
                    .collect();
                if mode == Inference::Const {
                    ValueType::tuple(items)
                } else if items.is_empty() {
                    ValueType::array(ValueType::Unknown)
                } else {
                    ValueType::array(ValueType::union(items))
                }
            }
            ExprKind::Object(properties) => self.infer_object(cx, properties, nested),
            ExprKind::Function(_) | ExprKind::Arrow(_) | ExprKind::Class(_) => ValueType::Function,
            ExprKind::New {
                callee, type_args, ..
            } => self.infer_construction(cx, callee, type_args),
            ExprKind::Call {
                callee,
                args,
                type_args,
                ..
            } => self.infer_call(cx, callee, type_args, args),
            ExprKind::Member {
                object, property, ..
            } => {
                if let Some(text) = expr.entity_text() {
                    let segments: Vec<&str> = text.split('.').collect();
                    if let Some(resolution) =
                        resolve_entity(self.oracle, &cx.file, cx.scope, &segments)
                    {
                        return self.value_type_of(cx, resolution);
                    }
                }
                let object = self.infer_expression(cx, object, Inference::Widened);
                match self.dereference(&object) {
                    ValueType::Object { fields } => fields
                        .get(&property.name)
                        .cloned()
                        .map(ValueType::into_required)
                        .unwrap_or(ValueType::Unknown),
                    ValueType::Array { .. } | ValueType::Tuple { .. } | ValueType::String
                        if property.name == "length" =>
                    {
                        ValueType::Number
                    }
                    _ => ValueType::Unknown,
                }
            }
            ExprKind::Unary { op, operand } => match op {
                UnaryOp::Not | UnaryOp::Delete => ValueType::Boolean,
                UnaryOp::TypeOf => ValueType::String,
                UnaryOp::Void => ValueType::Undefined,
                UnaryOp::BitNot => ValueType::Number,
                UnaryOp::Minus | UnaryOp::Plus => match numeric_value(expr) {
                    Some(value) => widen(ValueType::number_literal(value), ValueType::Number, mode),
                    None => ValueType::Number,
                },
                UnaryOp::Await => match self.infer_expression(cx, operand, mode) {
                    ValueType::Promise { ty } => *ty,
                    other => other,
                },
            },
            ExprKind::Update(_) => ValueType::Number,
            ExprKind::Binary { op, left, right } => match op.as_str() {
                "+" => {
                    let left = self.infer_expression(cx, left, Inference::Widened);
                    let right = self.infer_expression(cx, right, Inference::Widened);
                    if left == ValueType::Number && right == ValueType::Number {
                        ValueType::Number
                    } else if left == ValueType::String || right == ValueType::String {
                        ValueType::String
                    } else {
                        ValueType::Unknown
                    }
                }
                "-" | "*" | "/" | "%" | "**" | "|" | "&" | "^" | "<<" | ">>" | ">>>" => {
                    ValueType::Number
                }
                "==" | "!=" | "===" | "!==" | "<" | ">" | "<=" | ">=" | "in" | "instanceof" => {
                    ValueType::Boolean
                }
                "&&" | "||" | "??" => {
                    let left = self.infer_expression(cx, left, mode);
                    let right = self.infer_expression(cx, right, mode);
                    ValueType::union([left, right])
                }
                _ => ValueType::Unknown,
            },
            ExprKind::Conditional {
                consequent,
                alternate,
                ..
            } => {
                let when_true = self.infer_expression(cx, consequent, mode);
                let when_false = self.infer_expression(cx, alternate, mode);
                ValueType::union([when_true, when_false])
            }
            ExprKind::Assign { value, .. } => self.infer_expression(cx, value, mode),
            ExprKind::Sequence(items) => match items.last() {
                Some(last) => self.infer_expression(cx, last, mode),
                None => ValueType::Unknown,
            },
            ExprKind::This
            | ExprKind::Super
            | ExprKind::BigInt(_)
            | ExprKind::Regex
            | ExprKind::TaggedTemplate(_)
            | ExprKind::Index { .. }
            | ExprKind::Jsx
            | ExprKind::Other => ValueType::Unknown,
        }
    }

    fn infer_object(
        &mut self,
        cx: &Context,
        properties: &[ObjectProperty],
        mode: Inference,
    ) -> ValueType {
        let mut fields = Fields::new();
        for property in properties {
            match property {
                ObjectProperty::KeyValue { key, value } => {
                    if let Some(key) = key.as_text() {
                        let ty = self.infer_expression(cx, value, mode);
                        fields.insert(key, ty);
                    }
                }
                ObjectProperty::Shorthand(ident) => {
                    let ty = match resolve_identifier(self.oracle, &cx.file, cx.scope, &ident.name)
                    {
                        Some(resolution) => self.value_type_of(cx, resolution),
                        None => ValueType::Unknown,
                    };
                    fields.insert(ident.name.clone(), ty);
                }
                ObjectProperty::Spread(expr) => {
                    let spread = self.infer_expression(cx, expr, mode);
                    if let ValueType::Object { fields: spread } = self.dereference(&spread) {
                        fields.extend(spread);
                    }
                }
                ObjectProperty::Method { key, .. } => {
                    if let Some(key) = key.as_text() {
                        fields.insert(key, ValueType::Function);
                    }
                }
                ObjectProperty::Getter { key, .. } => {
                    if let Some(key) = key.as_text() {
                        fields.entry(key).or_insert(ValueType::Any);
                    }
                }
                ObjectProperty::Setter { .. } => {}
            }
        }
        ValueType::object(fields)
    }

    /// `new X<T>(...)`.
    fn infer_construction(
        &mut self,
        cx: &Context,
        callee: &Expression,
        type_args: &[TypeNode],
    ) -> ValueType {
        let args: Vec<ValueType> = type_args
            .iter()
            .map(|arg| self.resolve_node(cx, arg))
            .collect();
        let arg = |index: usize| args.get(index).cloned().unwrap_or(ValueType::Unknown);
        let Some(name) = callee.as_identifier() else {
            return ValueType::Unknown;
        };
        let local = tspreview_checker::oracle::lookup_local(&cx.file, cx.scope, name);
        match name {
            "Map" | "WeakMap" if local.is_none() => ValueType::map(arg(0), arg(1)),
            "Set" | "WeakSet" if local.is_none() => ValueType::set(arg(0)),
            "Array" if local.is_none() => ValueType::array(arg(0)),
            "Promise" if local.is_none() => ValueType::promise(arg(0)),
            _ => {
                let Some(resolution) = resolve_identifier(self.oracle, &cx.file, cx.scope, name)
                else {
                    return ValueType::Unknown;
                };
                match resolution.binding {
                    Binding::Symbol(symbol) if resolution.fully_qualified_name.is_none() => self
                        .resolve_symbol_type(&symbol, args.clone())
                        .unwrap_or(ValueType::Unknown),
                    _ => ValueType::Unknown,
                }
            }
        }
    }

    fn infer_call(
        &mut self,
        cx: &Context,
        callee: &Expression,
        type_args: &[TypeNode],
        args: &[ArrayElement],
    ) -> ValueType {
        let first_arg = args.iter().find_map(|arg| match arg {
            ArrayElement::Expr(expr) => Some(expr),
            _ => None,
        });
        let Some(text) = callee.entity_text() else {
            return ValueType::Unknown;
        };
        match text.as_str() {
            "String" => return ValueType::String,
            "Number" | "parseInt" | "parseFloat" => return ValueType::Number,
            "Boolean" => return ValueType::Boolean,
            "Array.from" | "Array.of" => return ValueType::array(ValueType::Unknown),
            "Promise.resolve" => {
                let value = match first_arg {
                    Some(expr) => self.infer_expression(cx, expr, Inference::Widened),
                    None => ValueType::Void,
                };
                return ValueType::promise(value);
            }
            "Promise.reject" => return ValueType::promise(ValueType::Never),
            "Symbol" => return ValueType::Unknown,
            _ => {}
        }

        let segments: Vec<&str> = text.split('.').collect();
        let Some(resolution) = resolve_entity(self.oracle, &cx.file, cx.scope, &segments) else {
            return ValueType::Unknown;
        };
        let Binding::Symbol(symbol) = resolution.binding else {
            return ValueType::Unknown;
        };
        let Some(function) = function_of(&symbol) else {
            return ValueType::Unknown;
        };
        let Some(return_type) = &function.return_type else {
            return ValueType::Unknown;
        };
        let mut callee_cx = Context::for_symbol(&symbol);
        let args: Vec<ValueType> = type_args
            .iter()
            .map(|arg| self.resolve_node(cx, arg))
            .collect();
        self.bind_type_params(&mut callee_cx, &function.type_params, &args);
        self.resolve_node(&callee_cx, return_type)
    }
}

/// The function a symbol declares: a function declaration, or a variable
/// initialized with a function or arrow expression.
pub(crate) fn function_of(symbol: &Symbol) -> Option<&Function> {
    symbol.declarations().find_map(|(_, view)| match view {
        DeclView::Function(function) => Some(function),
        DeclView::Variable { declarator, .. } => match &declarator.init.as_ref()?.skip_outer().kind {
            ExprKind::Arrow(function) | ExprKind::Function(function) => Some(function.as_ref()),
            _ => None,
        },
        _ => None,
    })
}

fn is_const_assertion(ty: &TypeNode) -> bool {
    matches!(
        &ty.kind,
        TypeKind::Reference { name, type_args }
            if type_args.is_empty() && name.is_simple() && name.first() == "const"
    )
}

fn widen(literal: ValueType, widened: ValueType, mode: Inference) -> ValueType {
    if mode.keeps_literals() {
        literal
    } else {
        widened
    }
}

/// Property keys leading from the root of a destructuring pattern to the
/// binding named `name`.
fn destructured_path<'p>(pattern: &'p BindingPattern, name: &str) -> Option<Vec<&'p str>> {
    match pattern {
        BindingPattern::Identifier(ident) => (ident.name == name).then(Vec::new),
        BindingPattern::Object { properties, .. } => properties.iter().find_map(|property| {
            let mut path = destructured_path(&property.value, name)?;
            let key = match &property.key {
                tspreview_syntax::ast::PropertyName::Ident(ident) => ident.name.as_str(),
                tspreview_syntax::ast::PropertyName::String(key, _) => key.as_str(),
                _ => return None,
            };
            path.insert(0, key);
            Some(path)
        }),
        BindingPattern::Array { .. } => None,
    }
}
