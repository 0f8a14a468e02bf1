//! `SerializableValue`: a synthesized (or story-authored) example value.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Settled state of a promise value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "camelCase")]
pub enum PromiseValue {
    Resolved(Box<SerializableValue>),
    Rejected,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum SerializableValue {
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    Array(Vec<SerializableValue>),
    Set(Vec<SerializableValue>),
    Object(IndexMap<String, SerializableValue>),
    /// Entries in insertion order.
    Map(Vec<(SerializableValue, SerializableValue)>),
    Promise(PromiseValue),
    /// Placeholder callable. `source` keeps the original text of a function
    /// written in a story.
    Function {
        source: Option<String>,
    },
    /// Opaque placeholder for values that cannot be synthesized.
    Unknown,
    /// Expansion of the collected type `name` was cut here to break a cycle.
    Recursive {
        name: String,
    },
}

impl SerializableValue {
    pub fn string(value: impl Into<String>) -> Self {
        SerializableValue::String(value.into())
    }

    pub fn function() -> Self {
        SerializableValue::Function { source: None }
    }

    pub fn resolved(value: SerializableValue) -> Self {
        SerializableValue::Promise(PromiseValue::Resolved(Box::new(value)))
    }

    pub fn rejected() -> Self {
        SerializableValue::Promise(PromiseValue::Rejected)
    }

    pub fn empty_object() -> Self {
        SerializableValue::Object(IndexMap::new())
    }

    pub fn is_function(&self) -> bool {
        matches!(self, SerializableValue::Function { .. })
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, SerializableValue::Unknown)
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, SerializableValue>> {
        match self {
            SerializableValue::Object(fields) => Some(fields),
            _ => None,
        }
    }

    /// Whether a recursive marker occurs anywhere in the value.
    pub fn contains_recursive(&self) -> bool {
        match self {
            SerializableValue::Recursive { .. } => true,
            SerializableValue::Array(items) | SerializableValue::Set(items) => {
                items.iter().any(SerializableValue::contains_recursive)
            }
            SerializableValue::Object(fields) => {
                fields.values().any(SerializableValue::contains_recursive)
            }
            SerializableValue::Map(entries) => entries
                .iter()
                .any(|(key, value)| key.contains_recursive() || value.contains_recursive()),
            SerializableValue::Promise(PromiseValue::Resolved(value)) => {
                value.contains_recursive()
            }
            _ => false,
        }
    }

    /// Structural equality that treats any two function placeholders as
    /// equal, regardless of the source text they carry.
    pub fn same_shape(&self, other: &SerializableValue) -> bool {
        use SerializableValue as V;
        match (self, other) {
            (V::Function { .. }, V::Function { .. }) => true,
            (V::Number(a), V::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (V::Array(a), V::Array(b)) | (V::Set(a), V::Set(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_shape(y))
            }
            (V::Object(a), V::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|((ka, va), (kb, vb))| ka == kb && va.same_shape(vb))
            }
            (V::Map(a), V::Map(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|((ka, va), (kb, vb))| ka.same_shape(kb) && va.same_shape(vb))
            }
            (V::Promise(PromiseValue::Resolved(a)), V::Promise(PromiseValue::Resolved(b))) => {
                a.same_shape(b)
            }
            _ => self == other,
        }
    }

    /// Shallow merge: fields of `overrides` replace fields of `self` when both
    /// are objects; otherwise `overrides` wins outright.
    pub fn merged_with(self, overrides: SerializableValue) -> SerializableValue {
        match (self, overrides) {
            (SerializableValue::Object(mut base), SerializableValue::Object(top)) => {
                for (key, value) in top {
                    base.insert(key, value);
                }
                SerializableValue::Object(base)
            }
            (_, top) => top,
        }
    }
}

#[cfg(test)]
#[path = "../tests/value_tests.rs"]
mod value_tests;
