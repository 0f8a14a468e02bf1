//! Example-value synthesis.
//!
//! [`ValueSynthesizer`] turns a resolved [`ValueType`] into a representative
//! [`SerializableValue`]. Output is deterministic: the same type, collected
//! table and policy always produce the same value.
//!
//! `name` references are expanded through the [`CollectedTypes`] table. A
//! name that is already being expanded on the current path becomes a
//! [`SerializableValue::Recursive`] marker, so every cycle is cut exactly
//! once per path. Anything that cannot be synthesized degrades to
//! [`SerializableValue::Unknown`] without affecting its siblings.

use indexmap::IndexMap;
use tracing::{debug, trace};
use tspreview_common::{DepthCounter, RecursionGuard, RecursionProfile, RecursionResult};
use tspreview_types::{CollectedTypes, EnumValue, LiteralValue, SerializableValue, ValueType};

use crate::policy::{OptionalFieldPolicy, SynthesisPolicy, UnionPolicy};

/// Cost of a member that would recurse into a name already on the path.
const CYCLE_COST: u32 = 1_000;
/// Cost of members that can only become the opaque placeholder.
const OPAQUE_COST: u32 = 100;

/// Synthesize a value for `ty` with the default policy.
pub fn generate(ty: &ValueType, collected: &CollectedTypes) -> SerializableValue {
    ValueSynthesizer::new(collected, SynthesisPolicy::default()).generate(ty)
}

pub struct ValueSynthesizer<'a> {
    collected: &'a CollectedTypes,
    policy: SynthesisPolicy,
    /// Names being expanded on the current path.
    names: RecursionGuard<String>,
    /// Structural nesting depth.
    depth: DepthCounter,
}

impl<'a> ValueSynthesizer<'a> {
    pub fn new(collected: &'a CollectedTypes, policy: SynthesisPolicy) -> Self {
        ValueSynthesizer {
            collected,
            policy,
            names: RecursionGuard::with_profile(RecursionProfile::ValueSynthesis),
            depth: DepthCounter::with_profile(RecursionProfile::ValueSynthesis),
        }
    }

    pub fn policy(&self) -> SynthesisPolicy {
        self.policy
    }

    pub fn generate(&mut self, ty: &ValueType) -> SerializableValue {
        let value = self.synthesize(ty);
        if self.depth.is_exceeded() || self.names.is_exceeded() {
            debug!(ty = %ty, "synthesis budget exceeded; deep subtrees left opaque");
        }
        value
    }

    fn synthesize(&mut self, ty: &ValueType) -> SerializableValue {
        if !self.depth.enter() {
            return SerializableValue::Unknown;
        }
        let value = self.synthesize_inner(ty);
        self.depth.leave();
        value
    }

    fn synthesize_inner(&mut self, ty: &ValueType) -> SerializableValue {
        match ty {
            ValueType::Any | ValueType::Unknown | ValueType::Never => SerializableValue::Unknown,
            ValueType::Void | ValueType::Undefined => SerializableValue::Undefined,
            ValueType::Null => SerializableValue::Null,
            ValueType::Boolean => SerializableValue::Boolean(false),
            ValueType::String => SerializableValue::string(""),
            ValueType::Number => SerializableValue::Number(0.0),
            ValueType::Literal { value } => literal_value(value),
            ValueType::Array { items } => SerializableValue::Array(vec![self.synthesize(items)]),
            ValueType::Set { items } => SerializableValue::Set(vec![self.synthesize(items)]),
            ValueType::Tuple { items } => {
                SerializableValue::Array(items.iter().map(|item| self.synthesize(item)).collect())
            }
            ValueType::Map { .. } => SerializableValue::Map(Vec::new()),
            ValueType::Record { .. } => SerializableValue::empty_object(),
            ValueType::Promise { ty } => SerializableValue::resolved(self.synthesize(ty)),
            // Outside an object an optional wrapper only widens the type.
            ValueType::Optional { ty } => self.synthesize(ty),
            ValueType::Object { fields } => {
                let mut object = IndexMap::with_capacity(fields.len());
                for (name, field) in fields {
                    if let Some(value) = self.synthesize_field(field) {
                        object.insert(name.clone(), value);
                    }
                }
                SerializableValue::Object(object)
            }
            ValueType::Union { types } => match self.pick_member(types) {
                Some(member) => self.synthesize(member),
                None => SerializableValue::Unknown,
            },
            ValueType::Intersection { types } => self.synthesize_intersection(types),
            ValueType::Function => SerializableValue::function(),
            ValueType::Enum { options, .. } => match options.values().next() {
                Some(EnumValue::String(value)) => SerializableValue::string(value.clone()),
                Some(EnumValue::Number(value)) => SerializableValue::Number(*value),
                None => SerializableValue::Unknown,
            },
            ValueType::Name { name } => self.synthesize_name(name),
        }
    }

    /// Value of one object field, or `None` when an optional field is left out.
    fn synthesize_field(&mut self, field: &ValueType) -> Option<SerializableValue> {
        let ValueType::Optional { ty } = field else {
            return Some(self.synthesize(field));
        };
        let (callable, scalar) = {
            let target = self.follow_names(ty);
            (target.is_callable(), target.is_scalar())
        };
        // `onClick?: (() => void) | undefined` still gets the callback.
        if callable {
            return Some(SerializableValue::function());
        }
        let include = match self.policy.optional_fields {
            OptionalFieldPolicy::Always => true,
            OptionalFieldPolicy::Never => false,
            OptionalFieldPolicy::CheapOnly => scalar,
        };
        include.then(|| self.synthesize(ty))
    }

    fn synthesize_name(&mut self, name: &str) -> SerializableValue {
        let Some(target) = self.collected.get(name) else {
            debug!(name, "no collected entry for name");
            return SerializableValue::Unknown;
        };
        match self.names.enter(name.to_string()) {
            RecursionResult::Entered => {}
            RecursionResult::Cycle => {
                trace!(name, "recursive reference");
                return SerializableValue::Recursive {
                    name: name.to_string(),
                };
            }
            RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => {
                return SerializableValue::Unknown;
            }
        }
        let value = self.synthesize(target);
        self.names.leave(&name.to_string());
        value
    }

    /// Object members merge field by field (later members win); without any
    /// object member the first member stands for the whole intersection.
    fn synthesize_intersection(&mut self, types: &[ValueType]) -> SerializableValue {
        let values: Vec<SerializableValue> = types.iter().map(|ty| self.synthesize(ty)).collect();
        let mut merged: Option<SerializableValue> = None;
        for value in &values {
            if matches!(value, SerializableValue::Object(_)) {
                merged = Some(match merged {
                    Some(base) => base.merged_with(value.clone()),
                    None => value.clone(),
                });
            }
        }
        merged
            .or_else(|| values.into_iter().next())
            .unwrap_or(SerializableValue::Unknown)
    }

    fn pick_member<'t>(&self, types: &'t [ValueType]) -> Option<&'t ValueType> {
        match self.policy.union {
            UnionPolicy::FirstMember => types.first(),
            UnionPolicy::Simplest => types
                .iter()
                .enumerate()
                .min_by_key(|(index, ty)| (self.cost(ty, 0), *index))
                .map(|(_, ty)| ty),
        }
    }

    /// Rough cost of synthesizing `ty`, used to rank union members.
    fn cost(&self, ty: &ValueType, level: u32) -> u32 {
        match ty {
            ValueType::Null | ValueType::Undefined | ValueType::Void => 0,
            ValueType::Boolean
            | ValueType::String
            | ValueType::Number
            | ValueType::Literal { .. }
            | ValueType::Enum { .. } => 1,
            ValueType::Function => 2,
            ValueType::Map { .. } | ValueType::Record { .. } => 3,
            ValueType::Any | ValueType::Unknown | ValueType::Never => OPAQUE_COST,
            ValueType::Optional { ty } => self.cost(ty, level),
            ValueType::Union { types } => types
                .iter()
                .map(|member| self.cost(member, level))
                .min()
                .unwrap_or(OPAQUE_COST),
            _ if level >= 4 => 10,
            ValueType::Array { items } | ValueType::Set { items } | ValueType::Promise { ty: items } => {
                3 + self.cost(items, level + 1)
            }
            ValueType::Tuple { items } | ValueType::Intersection { types: items } => {
                3 + items
                    .iter()
                    .map(|item| self.cost(item, level + 1))
                    .fold(0, u32::saturating_add)
            }
            ValueType::Object { fields } => {
                3 + fields
                    .values()
                    .filter(|field| !field.is_optional())
                    .map(|field| self.cost(field, level + 1))
                    .fold(0, u32::saturating_add)
            }
            ValueType::Name { name } => {
                if self.names.is_visiting(name) {
                    return CYCLE_COST;
                }
                match self.collected.get(name) {
                    Some(target) => 5 + self.cost(target, level + 1),
                    None => OPAQUE_COST,
                }
            }
        }
    }

    /// Follow `name` references to the type they stand for.
    fn follow_names<'t>(&'t self, ty: &'t ValueType) -> &'t ValueType {
        let mut current = ty;
        for _ in 0..8 {
            match current {
                ValueType::Name { name } => match self.collected.get(name) {
                    Some(target) => current = target,
                    None => return current,
                },
                _ => return current,
            }
        }
        current
    }
}

fn literal_value(value: &LiteralValue) -> SerializableValue {
    match value {
        LiteralValue::String(value) => SerializableValue::string(value.clone()),
        LiteralValue::Number(value) => SerializableValue::Number(*value),
        LiteralValue::Boolean(value) => SerializableValue::Boolean(*value),
    }
}

#[cfg(test)]
#[path = "../tests/generate_tests.rs"]
mod generate_tests;
