//! `ValueType`: the resolved shape of a TypeScript type.
//!
//! A `ValueType` tree is finite. Recursive types are broken by
//! [`ValueType::Name`] references into a [`CollectedTypes`](crate::CollectedTypes)
//! side table.
//!
//! Unions and intersections should be built with [`ValueType::union`] and
//! [`ValueType::intersection`], which normalize their members.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Value of a literal type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LiteralValue {
    String(String),
    Number(f64),
    Boolean(bool),
}

/// Value of an enum member.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumValue {
    String(String),
    Number(f64),
}

impl From<EnumValue> for LiteralValue {
    fn from(value: EnumValue) -> Self {
        match value {
            EnumValue::String(s) => LiteralValue::String(s),
            EnumValue::Number(n) => LiteralValue::Number(n),
        }
    }
}

/// Ordered object fields; optional fields are wrapped in [`ValueType::Optional`].
pub type Fields = IndexMap<String, ValueType>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ValueType {
    Any,
    Unknown,
    Never,
    Void,
    Null,
    Undefined,
    Boolean,
    String,
    Number,
    Literal {
        value: LiteralValue,
    },
    Array {
        items: Box<ValueType>,
    },
    Set {
        items: Box<ValueType>,
    },
    Promise {
        #[serde(rename = "type")]
        ty: Box<ValueType>,
    },
    Tuple {
        items: Vec<ValueType>,
    },
    Object {
        fields: Fields,
    },
    Optional {
        #[serde(rename = "type")]
        ty: Box<ValueType>,
    },
    Union {
        types: Vec<ValueType>,
    },
    Intersection {
        types: Vec<ValueType>,
    },
    /// Callable; the signature is erased.
    Function,
    Enum {
        name: String,
        options: IndexMap<String, EnumValue>,
    },
    /// Reference to an entry of `CollectedTypes`.
    Name {
        name: String,
    },
    Map {
        key: Box<ValueType>,
        value: Box<ValueType>,
    },
    Record {
        key: Box<ValueType>,
        value: Box<ValueType>,
    },
}

impl ValueType {
    // =========================================================================
    // Constructors
    // =========================================================================

    pub fn string_literal(value: impl Into<String>) -> Self {
        ValueType::Literal {
            value: LiteralValue::String(value.into()),
        }
    }

    pub fn number_literal(value: f64) -> Self {
        ValueType::Literal {
            value: LiteralValue::Number(value),
        }
    }

    pub fn boolean_literal(value: bool) -> Self {
        ValueType::Literal {
            value: LiteralValue::Boolean(value),
        }
    }

    pub fn array(items: ValueType) -> Self {
        ValueType::Array {
            items: Box::new(items),
        }
    }

    pub fn set(items: ValueType) -> Self {
        ValueType::Set {
            items: Box::new(items),
        }
    }

    pub fn promise(ty: ValueType) -> Self {
        ValueType::Promise { ty: Box::new(ty) }
    }

    pub fn tuple(items: Vec<ValueType>) -> Self {
        ValueType::Tuple { items }
    }

    pub fn object(fields: Fields) -> Self {
        ValueType::Object { fields }
    }

    pub fn empty_object() -> Self {
        ValueType::Object {
            fields: Fields::new(),
        }
    }

    pub fn name(name: impl Into<String>) -> Self {
        ValueType::Name { name: name.into() }
    }

    pub fn map(key: ValueType, value: ValueType) -> Self {
        ValueType::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn record(key: ValueType, value: ValueType) -> Self {
        ValueType::Record {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// Mark a field optional. Already-optional types are not wrapped twice.
    pub fn optional(ty: ValueType) -> Self {
        match ty {
            ValueType::Optional { .. } => ty,
            other => ValueType::Optional {
                ty: Box::new(other),
            },
        }
    }

    /// Normalized union: nested unions are flattened, `never` is dropped,
    /// structurally-equal members are deduplicated (first occurrence wins),
    /// a single member stands alone and an empty union is `never`.
    pub fn union(types: impl IntoIterator<Item = ValueType>) -> Self {
        let mut members: Vec<ValueType> = Vec::new();
        for ty in types {
            push_union_member(&mut members, ty);
        }
        match members.len() {
            0 => ValueType::Never,
            1 => members.pop().unwrap_or(ValueType::Never),
            _ => ValueType::Union { types: members },
        }
    }

    /// Normalized intersection: nested intersections are flattened, `unknown`
    /// and `any` members are absorbed, `never` wins, and all object members
    /// merge into one object at the position of the first.
    pub fn intersection(types: impl IntoIterator<Item = ValueType>) -> Self {
        let mut flat = Vec::new();
        for ty in types {
            match ty {
                ValueType::Intersection { types } => flat.extend(types),
                other => flat.push(other),
            }
        }

        let mut members: Vec<ValueType> = Vec::new();
        let mut object_index: Option<usize> = None;
        for ty in flat {
            match ty {
                ValueType::Never => return ValueType::Never,
                ValueType::Unknown | ValueType::Any => {}
                ValueType::Object { fields } => match object_index {
                    Some(index) => {
                        if let ValueType::Object { fields: merged } = &mut members[index] {
                            merge_fields(merged, fields);
                        }
                    }
                    None => {
                        object_index = Some(members.len());
                        members.push(ValueType::Object { fields });
                    }
                },
                other => {
                    if !members.contains(&other) {
                        members.push(other);
                    }
                }
            }
        }
        match members.len() {
            0 => ValueType::Unknown,
            1 => members.pop().unwrap_or(ValueType::Unknown),
            _ => ValueType::Intersection { types: members },
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn is_optional(&self) -> bool {
        matches!(self, ValueType::Optional { .. })
    }

    /// The wrapped type of an optional field, or `self`.
    pub fn strip_optional(&self) -> &ValueType {
        match self {
            ValueType::Optional { ty } => ty,
            other => other,
        }
    }

    pub fn into_required(self) -> ValueType {
        match self {
            ValueType::Optional { ty } => *ty,
            other => other,
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(self, ValueType::Function)
    }

    /// Callable once optionality and `undefined`/`null` union members are
    /// ignored (`onClick?: () => void`, `cb: (() => void) | null`).
    pub fn is_callable(&self) -> bool {
        match self.strip_optional() {
            ValueType::Function => true,
            ValueType::Union { types } => {
                let mut saw_function = false;
                for ty in types {
                    match ty {
                        ValueType::Function => saw_function = true,
                        ValueType::Undefined | ValueType::Null | ValueType::Void => {}
                        _ => return false,
                    }
                }
                saw_function
            }
            _ => false,
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            ValueType::Any
                | ValueType::Unknown
                | ValueType::Never
                | ValueType::Void
                | ValueType::Null
                | ValueType::Undefined
                | ValueType::Boolean
                | ValueType::String
                | ValueType::Number
        )
    }

    /// Scalar shapes whose example value is trivially cheap: primitives,
    /// literals, enums, and unions of those.
    pub fn is_scalar(&self) -> bool {
        match self.strip_optional() {
            ValueType::Literal { .. } | ValueType::Enum { .. } => true,
            ValueType::Union { types } => types.iter().all(ValueType::is_scalar),
            other => other.is_primitive(),
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self, ValueType::Object { .. })
    }

    pub fn fields(&self) -> Option<&Fields> {
        match self {
            ValueType::Object { fields } => Some(fields),
            _ => None,
        }
    }

    /// Every `name` reference in this tree, in traversal order (with repeats).
    pub fn referenced_names(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_names(&mut out);
        out
    }

    fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            ValueType::Name { name } => out.push(name),
            ValueType::Array { items } | ValueType::Set { items } => items.collect_names(out),
            ValueType::Promise { ty } | ValueType::Optional { ty } => ty.collect_names(out),
            ValueType::Tuple { items }
            | ValueType::Union { types: items }
            | ValueType::Intersection { types: items } => {
                for item in items {
                    item.collect_names(out);
                }
            }
            ValueType::Object { fields } => {
                for field in fields.values() {
                    field.collect_names(out);
                }
            }
            ValueType::Map { key, value } | ValueType::Record { key, value } => {
                key.collect_names(out);
                value.collect_names(out);
            }
            _ => {}
        }
    }

    /// Short human-readable kind name, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ValueType::Any => "any",
            ValueType::Unknown => "unknown",
            ValueType::Never => "never",
            ValueType::Void => "void",
            ValueType::Null => "null",
            ValueType::Undefined => "undefined",
            ValueType::Boolean => "boolean",
            ValueType::String => "string",
            ValueType::Number => "number",
            ValueType::Literal { .. } => "literal",
            ValueType::Array { .. } => "array",
            ValueType::Set { .. } => "set",
            ValueType::Promise { .. } => "promise",
            ValueType::Tuple { .. } => "tuple",
            ValueType::Object { .. } => "object",
            ValueType::Optional { .. } => "optional",
            ValueType::Union { .. } => "union",
            ValueType::Intersection { .. } => "intersection",
            ValueType::Function => "function",
            ValueType::Enum { .. } => "enum",
            ValueType::Name { .. } => "name",
            ValueType::Map { .. } => "map",
            ValueType::Record { .. } => "record",
        }
    }
}

fn push_union_member(members: &mut Vec<ValueType>, ty: ValueType) {
    match ty {
        ValueType::Union { types } => {
            for member in types {
                push_union_member(members, member);
            }
        }
        ValueType::Never => {}
        other => {
            if !members.contains(&other) {
                members.push(other);
            }
        }
    }
}

/// Merge `incoming` into `fields`. A field present on both sides becomes the
/// intersection of the two; it stays optional only if optional on both.
fn merge_fields(fields: &mut Fields, incoming: Fields) {
    for (name, ty) in incoming {
        match fields.get_mut(&name) {
            Some(existing) => {
                let optional = existing.is_optional() && ty.is_optional();
                let left = std::mem::replace(existing, ValueType::Unknown).into_required();
                let merged = if left == *ty.strip_optional() {
                    left
                } else {
                    ValueType::intersection([left, ty.into_required()])
                };
                *existing = if optional {
                    ValueType::optional(merged)
                } else {
                    merged
                };
            }
            None => {
                fields.insert(name, ty);
            }
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::String(s) => write!(f, "{s:?}"),
            LiteralValue::Number(n) => write!(f, "{n}"),
            LiteralValue::Boolean(b) => write!(f, "{b}"),
        }
    }
}

/// TypeScript-like rendering (`{ label: string; onClick?: Function }`).
impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Literal { value } => write!(f, "{value}"),
            ValueType::Array { items } => match items.as_ref() {
                ValueType::Union { .. } | ValueType::Intersection { .. } => {
                    write!(f, "({items})[]")
                }
                _ => write!(f, "{items}[]"),
            },
            ValueType::Set { items } => write!(f, "Set<{items}>"),
            ValueType::Promise { ty } => write!(f, "Promise<{ty}>"),
            ValueType::Tuple { items } => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            ValueType::Object { fields } => {
                if fields.is_empty() {
                    return f.write_str("{}");
                }
                f.write_str("{ ")?;
                for (i, (name, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    match ty {
                        ValueType::Optional { ty } => write!(f, "{name}?: {ty}")?,
                        _ => write!(f, "{name}: {ty}")?,
                    }
                }
                f.write_str(" }")
            }
            ValueType::Optional { ty } => write!(f, "{ty} | undefined"),
            ValueType::Union { types } | ValueType::Intersection { types } => {
                let separator = if matches!(self, ValueType::Union { .. }) {
                    " | "
                } else {
                    " & "
                };
                for (i, ty) in types.iter().enumerate() {
                    if i > 0 {
                        f.write_str(separator)?;
                    }
                    write!(f, "{ty}")?;
                }
                Ok(())
            }
            ValueType::Function => f.write_str("Function"),
            ValueType::Enum { name, .. } => f.write_str(name),
            ValueType::Name { name } => f.write_str(name),
            ValueType::Map { key, value } => write!(f, "Map<{key}, {value}>"),
            ValueType::Record { key, value } => write!(f, "Record<{key}, {value}>"),
            primitive => f.write_str(primitive.kind_name()),
        }
    }
}

#[cfg(test)]
#[path = "../tests/value_type_tests.rs"]
mod value_type_tests;
