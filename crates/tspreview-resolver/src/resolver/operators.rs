//! Type operators: `keyof`, indexed access, mapped and conditional types.

use rustc_hash::FxHashMap;
use tspreview_syntax::ast::{
    MappedModifier, MappedType, TypeKind, TypeMemberKind, TypeNode, TypeOperatorKind,
    format_number_key,
};
use tspreview_types::{Fields, LiteralValue, ValueType};

use super::{Context, TypeGraphResolver};

/// Nesting limit for structural assignability checks.
const MAX_ASSIGNABILITY_DEPTH: u32 = 8;

impl TypeGraphResolver<'_> {
    pub(crate) fn keyof(&self, ty: &ValueType) -> ValueType {
        match self.dereference(ty) {
            ValueType::Object { fields } => {
                ValueType::union(fields.keys().map(|key| ValueType::string_literal(key.clone())))
            }
            ValueType::Record { key, .. } => *key,
            ValueType::Array { .. } | ValueType::Tuple { .. } => ValueType::Number,
            ValueType::Any => ValueType::union([ValueType::String, ValueType::Number]),
            ValueType::Intersection { types } => {
                ValueType::union(types.iter().map(|member| self.keyof(member)))
            }
            ValueType::Union { types } => {
                // Only keys every member has.
                let mut members = types.iter().map(|member| self.dereference(member));
                let Some(first) = members.next() else {
                    return ValueType::Never;
                };
                let Some(first_fields) = first.fields() else {
                    return ValueType::Never;
                };
                let mut keys: Vec<String> = first_fields.keys().cloned().collect();
                for member in members {
                    match member.fields() {
                        Some(fields) => keys.retain(|key| fields.contains_key(key)),
                        None => return ValueType::Never,
                    }
                }
                ValueType::union(keys.into_iter().map(ValueType::string_literal))
            }
            _ => ValueType::Never,
        }
    }

    pub(crate) fn indexed_access(
        &mut self,
        cx: &Context,
        object: &ValueType,
        index: &ValueType,
    ) -> ValueType {
        if let ValueType::Union { types } = index {
            let results: Vec<ValueType> = types
                .iter()
                .map(|member| self.indexed_access(cx, object, member))
                .collect();
            return ValueType::union(results);
        }

        match (self.dereference(object), index) {
            (ValueType::Any, _) => ValueType::Any,
            (ValueType::Union { types }, _) => {
                let results: Vec<ValueType> = types
                    .iter()
                    .map(|member| self.indexed_access(cx, member, index))
                    .collect();
                ValueType::union(results)
            }
            (ValueType::Object { fields }, ValueType::Literal { value }) => {
                let key = literal_key(value);
                match fields.get(&key) {
                    Some(field) => read_field(field),
                    None => {
                        self.warn(cx, format_args!("property `{key}` does not exist"));
                        ValueType::Unknown
                    }
                }
            }
            (ValueType::Object { fields }, ValueType::String) => {
                ValueType::union(fields.values().map(read_field))
            }
            (ValueType::Record { value, .. }, _) => *value,
            (ValueType::Array { .. } | ValueType::Tuple { .. }, ValueType::Literal { value })
                if matches!(value, LiteralValue::String(key) if key == "length") =>
            {
                ValueType::Number
            }
            (ValueType::Array { items }, ValueType::Number | ValueType::Literal { .. }) => *items,
            (ValueType::Tuple { items }, ValueType::Literal { value: LiteralValue::Number(n) }) => {
                match items.get(*n as usize) {
                    Some(item) => read_field(item),
                    None => {
                        self.warn(cx, format_args!("tuple has no element at index {n}"));
                        ValueType::Unknown
                    }
                }
            }
            (ValueType::Tuple { items }, ValueType::Number) => {
                ValueType::union(items.iter().map(read_field))
            }
            (other, index) => {
                self.warn(
                    cx,
                    format_args!("cannot index `{other}` with `{index}`"),
                );
                ValueType::Unknown
            }
        }
    }

    pub(crate) fn resolve_mapped(&mut self, cx: &Context, mapped: &MappedType) -> ValueType {
        // `{ [K in keyof T]: ... }` keeps the optionality of `T`'s fields.
        let source = match &mapped.constraint.unparenthesized().kind {
            TypeKind::TypeOperator {
                op: TypeOperatorKind::KeyOf,
                ty,
            } => {
                let resolved = self.resolve_node(cx, ty);
                Some(self.dereference(&resolved))
            }
            _ => None,
        };
        let constraint = match &source {
            Some(source) => self.keyof(source),
            None => self.resolve_node(cx, &mapped.constraint),
        };
        let param = mapped.type_param.name.as_str();

        let Some(keys) = literal_keys(&constraint) else {
            let inner = cx.bind(param, constraint.clone());
            let value = match &mapped.ty {
                Some(ty) => self.resolve_node(&inner, ty),
                None => ValueType::Any,
            };
            return ValueType::record(constraint, value);
        };

        let mut fields = Fields::new();
        for key in keys {
            let inner = cx.bind(param, ValueType::string_literal(key.clone()));
            let name = match &mapped.name_type {
                Some(node) => match self.resolve_node(&inner, node) {
                    ValueType::Never => continue,
                    ValueType::Literal { value } => literal_key(&value),
                    _ => key.clone(),
                },
                None => key.clone(),
            };
            let value = match &mapped.ty {
                Some(ty) => self.resolve_node(&inner, ty),
                None => ValueType::Any,
            };
            let source_optional = source
                .as_ref()
                .and_then(ValueType::fields)
                .and_then(|fields| fields.get(&key))
                .is_some_and(ValueType::is_optional);
            let value = match (mapped.optional, source_optional) {
                (MappedModifier::Add, _) | (MappedModifier::None, true) => {
                    ValueType::optional(without_undefined(value.into_required()))
                }
                (MappedModifier::Remove, _) => without_undefined(value.into_required()),
                (MappedModifier::None, false) => value,
            };
            fields.insert(name, value);
        }
        ValueType::object(fields)
    }

    pub(crate) fn resolve_conditional(
        &mut self,
        cx: &Context,
        check: &TypeNode,
        extends: &TypeNode,
        true_type: &TypeNode,
        false_type: &TypeNode,
    ) -> ValueType {
        // A naked type parameter distributes over a union argument.
        if let TypeKind::Reference { name, type_args } = &check.unparenthesized().kind
            && type_args.is_empty()
            && name.is_simple()
            && let Some(bound) = cx.env.get(name.first())
        {
            match bound {
                ValueType::Never => return ValueType::Never,
                ValueType::Union { types } => {
                    let param = name.first().to_string();
                    let results: Vec<ValueType> = types
                        .clone()
                        .into_iter()
                        .map(|member| {
                            let inner = cx.bind(&param, member);
                            self.resolve_conditional_once(&inner, check, extends, true_type, false_type)
                        })
                        .collect();
                    return ValueType::union(results);
                }
                _ => {}
            }
        }
        self.resolve_conditional_once(cx, check, extends, true_type, false_type)
    }

    fn resolve_conditional_once(
        &mut self,
        cx: &Context,
        check: &TypeNode,
        extends: &TypeNode,
        true_type: &TypeNode,
        false_type: &TypeNode,
    ) -> ValueType {
        let check_ty = self.resolve_node(cx, check);
        let check_ty = self.dereference(&check_ty);
        let extends_ty = self.resolve_node(cx, extends);

        match self.is_assignable(&check_ty, &extends_ty) {
            Some(true) => {
                let mut inferred = FxHashMap::default();
                self.infer_from(extends, &check_ty, &mut inferred);
                let mut branch = cx.clone();
                let mut names = Vec::new();
                collect_infer_names(extends, &mut names);
                for name in names {
                    let ty = inferred.remove(&name).unwrap_or(ValueType::Unknown);
                    branch.env.insert(name, ty);
                }
                self.resolve_node(&branch, true_type)
            }
            Some(false) => self.resolve_node(cx, false_type),
            None => {
                let mut branch = cx.clone();
                let mut names = Vec::new();
                collect_infer_names(extends, &mut names);
                for name in names {
                    branch.env.insert(name, ValueType::Unknown);
                }
                let when_true = self.resolve_node(&branch, true_type);
                let when_false = self.resolve_node(cx, false_type);
                ValueType::union([when_true, when_false])
            }
        }
    }

    /// Bind `infer X` positions of `pattern` against `source`.
    fn infer_from(
        &self,
        pattern: &TypeNode,
        source: &ValueType,
        out: &mut FxHashMap<String, ValueType>,
    ) {
        let source = self.dereference(source);
        match (&pattern.kind, &source) {
            (TypeKind::Infer { name, .. }, _) => {
                out.insert(name.name.clone(), source.clone());
            }
            (TypeKind::Paren(inner), _) => self.infer_from(inner, &source, out),
            (TypeKind::Array(element), ValueType::Array { items }) => {
                self.infer_from(element, items, out);
            }
            (TypeKind::Reference { name, type_args }, _) if type_args.len() == 1 => {
                let inner = match (name.last(), &source) {
                    ("Array" | "ReadonlyArray", ValueType::Array { items }) => items.as_ref(),
                    ("Promise" | "PromiseLike", ValueType::Promise { ty }) => ty.as_ref(),
                    ("Set" | "ReadonlySet", ValueType::Set { items }) => items.as_ref(),
                    _ => return,
                };
                self.infer_from(&type_args[0], inner, out);
            }
            (TypeKind::TypeLiteral(members), ValueType::Object { fields }) => {
                for member in members {
                    if let TypeMemberKind::Property {
                        name, ty: Some(ty), ..
                    } = &member.kind
                        && let Some(key) = name.as_text()
                        && let Some(field) = fields.get(&key)
                    {
                        self.infer_from(ty, field.strip_optional(), out);
                    }
                }
            }
            _ => {}
        }
    }

    /// Structural assignability of resolved types; `None` when it cannot be
    /// decided from the erased shapes.
    pub(crate) fn is_assignable(&self, source: &ValueType, target: &ValueType) -> Option<bool> {
        self.is_assignable_at(source, target, 0)
    }

    fn is_assignable_at(&self, source: &ValueType, target: &ValueType, depth: u32) -> Option<bool> {
        if depth > MAX_ASSIGNABILITY_DEPTH {
            return None;
        }
        let source = self.dereference(source);
        let target = self.dereference(target);
        let next = depth + 1;
        match (&source, &target) {
            (_, ValueType::Any | ValueType::Unknown) => Some(true),
            (ValueType::Never, _) => Some(true),
            (ValueType::Any | ValueType::Unknown, _) => None,
            (ValueType::Optional { ty }, _) => {
                let undefined = self.is_assignable_at(&ValueType::Undefined, &target, next);
                all_of([self.is_assignable_at(ty, &target, next), undefined])
            }
            (ValueType::Union { types }, _) => {
                all_of(types.iter().map(|member| self.is_assignable_at(member, &target, next)))
            }
            (_, ValueType::Union { types }) => {
                any_of(types.iter().map(|member| self.is_assignable_at(&source, member, next)))
            }
            (_, ValueType::Intersection { types }) => {
                all_of(types.iter().map(|member| self.is_assignable_at(&source, member, next)))
            }
            (ValueType::Literal { value: left }, ValueType::Literal { value: right }) => {
                Some(left == right)
            }
            (ValueType::Literal { value }, _) if target.is_primitive() => {
                Some(matches!(
                    (value, &target),
                    (LiteralValue::String(_), ValueType::String)
                        | (LiteralValue::Number(_), ValueType::Number)
                        | (LiteralValue::Boolean(_), ValueType::Boolean)
                ))
            }
            (ValueType::Boolean, ValueType::Literal { .. }) => None,
            (_, ValueType::Literal { .. }) if source.is_primitive() => Some(false),
            (ValueType::Undefined, ValueType::Void) => Some(true),
            (ValueType::Enum { options, .. }, ValueType::Number | ValueType::String) => {
                let wanted_number = matches!(target, ValueType::Number);
                Some(options.values().all(|value| {
                    matches!(value, tspreview_types::EnumValue::Number(_)) == wanted_number
                }))
            }
            (left, right) if left.is_primitive() && right.is_primitive() => Some(left == right),
            (ValueType::Function, ValueType::Function) => Some(true),
            (ValueType::Array { items: left }, ValueType::Array { items: right })
            | (ValueType::Set { items: left }, ValueType::Set { items: right })
            | (ValueType::Promise { ty: left }, ValueType::Promise { ty: right }) => {
                self.is_assignable_at(left, right, next)
            }
            (ValueType::Tuple { items }, ValueType::Array { items: element }) => {
                all_of(items.iter().map(|item| self.is_assignable_at(item, element, next)))
            }
            (_, ValueType::Object { fields }) if fields.is_empty() => Some(!matches!(
                source,
                ValueType::Null | ValueType::Undefined | ValueType::Void
            )),
            (ValueType::Object { fields: have }, ValueType::Object { fields: want }) => {
                all_of(want.iter().map(|(name, wanted)| match have.get(name) {
                    Some(field) => {
                        self.is_assignable_at(field.strip_optional(), wanted.strip_optional(), next)
                    }
                    None => Some(wanted.is_optional()),
                }))
            }
            (ValueType::Record { value, .. }, ValueType::Record { value: wanted, .. }) => {
                self.is_assignable_at(value, wanted, next)
            }
            (ValueType::Object { fields }, ValueType::Record { value, .. }) => {
                all_of(fields.values().map(|field| self.is_assignable_at(field.strip_optional(), value, next)))
            }
            (left, right) if is_structured(left) != is_structured(right) => Some(false),
            (ValueType::Function, _) | (_, ValueType::Function) => Some(false),
            _ => None,
        }
    }
}

fn is_structured(ty: &ValueType) -> bool {
    matches!(
        ty,
        ValueType::Object { .. }
            | ValueType::Array { .. }
            | ValueType::Tuple { .. }
            | ValueType::Set { .. }
            | ValueType::Map { .. }
            | ValueType::Record { .. }
            | ValueType::Promise { .. }
            | ValueType::Function
    )
}

fn all_of(results: impl IntoIterator<Item = Option<bool>>) -> Option<bool> {
    let mut decided = true;
    for result in results {
        match result {
            Some(false) => return Some(false),
            Some(true) => {}
            None => decided = false,
        }
    }
    decided.then_some(true)
}

fn any_of(results: impl IntoIterator<Item = Option<bool>>) -> Option<bool> {
    let mut decided = true;
    for result in results {
        match result {
            Some(true) => return Some(true),
            Some(false) => {}
            None => decided = false,
        }
    }
    decided.then_some(false)
}

/// Property key a literal type names.
pub(crate) fn literal_key(value: &LiteralValue) -> String {
    match value {
        LiteralValue::String(key) => key.clone(),
        LiteralValue::Number(n) => format_number_key(*n),
        LiteralValue::Boolean(b) => b.to_string(),
    }
}

/// Keys of a finite key type (`"a" | "b"`, an enum); `None` for `string`
/// and other open key types.
pub(crate) fn literal_keys(ty: &ValueType) -> Option<Vec<String>> {
    match ty {
        ValueType::Never => Some(Vec::new()),
        ValueType::Literal { value } => Some(vec![literal_key(value)]),
        ValueType::Enum { options, .. } => Some(
            options
                .values()
                .map(|value| literal_key(&value.clone().into()))
                .collect(),
        ),
        ValueType::Union { types } => {
            let mut keys = Vec::new();
            for member in types {
                for key in literal_keys(member)? {
                    if !keys.contains(&key) {
                        keys.push(key);
                    }
                }
            }
            Some(keys)
        }
        _ => None,
    }
}

/// Type read through a field: optional fields may be `undefined`.
fn read_field(field: &ValueType) -> ValueType {
    match field {
        ValueType::Optional { ty } => ValueType::union([(**ty).clone(), ValueType::Undefined]),
        other => other.clone(),
    }
}

pub(crate) fn without_undefined(ty: ValueType) -> ValueType {
    match ty {
        ValueType::Union { types } => ValueType::union(
            types
                .into_iter()
                .filter(|member| !matches!(member, ValueType::Undefined)),
        ),
        other => other,
    }
}

fn collect_infer_names(node: &TypeNode, out: &mut Vec<String>) {
    match &node.kind {
        TypeKind::Infer { name, .. } => {
            if !out.contains(&name.name) {
                out.push(name.name.clone());
            }
        }
        TypeKind::Paren(inner) | TypeKind::Array(inner) => collect_infer_names(inner, out),
        TypeKind::TypeOperator { ty, .. } => collect_infer_names(ty, out),
        TypeKind::Reference { type_args, .. } => {
            for arg in type_args {
                collect_infer_names(arg, out);
            }
        }
        TypeKind::Union(types) | TypeKind::Intersection(types) => {
            for ty in types {
                collect_infer_names(ty, out);
            }
        }
        TypeKind::Tuple(elements) => {
            for element in elements {
                collect_infer_names(&element.ty, out);
            }
        }
        TypeKind::TypeLiteral(members) => {
            for member in members {
                if let TypeMemberKind::Property { ty: Some(ty), .. } = &member.kind {
                    collect_infer_names(ty, out);
                }
            }
        }
        TypeKind::Function(function) => collect_infer_names(&function.return_type, out),
        TypeKind::IndexedAccess { object, index } => {
            collect_infer_names(object, out);
            collect_infer_names(index, out);
        }
        _ => {}
    }
}
