//! Synthesis policy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which member of a union an example value is built from. Members are
/// never combined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnionPolicy {
    /// The first member as written.
    #[default]
    FirstMember,
    /// The cheapest member to synthesize (`null` over an object, a scalar
    /// over a recursive reference); ties go to the earlier member.
    Simplest,
}

/// Which optional object fields get a value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OptionalFieldPolicy {
    /// Only fields whose value is scalar (primitive, literal, enum or a union
    /// of those).
    #[default]
    CheapOnly,
    Always,
    Never,
}

/// Optional callbacks are included under every [`OptionalFieldPolicy`] so a
/// preview can observe them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SynthesisPolicy {
    pub union: UnionPolicy,
    pub optional_fields: OptionalFieldPolicy,
}

impl SynthesisPolicy {
    pub fn with_union(mut self, union: UnionPolicy) -> Self {
        self.union = union;
        self
    }

    pub fn with_optional_fields(mut self, optional_fields: OptionalFieldPolicy) -> Self {
        self.optional_fields = optional_fields;
        self
    }
}

#[derive(Debug, Error)]
#[error("unknown {kind} policy `{value}` (expected {expected})")]
pub struct UnknownPolicy {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

impl UnionPolicy {
    pub fn name(self) -> &'static str {
        match self {
            UnionPolicy::FirstMember => "first-member",
            UnionPolicy::Simplest => "simplest",
        }
    }
}

impl OptionalFieldPolicy {
    pub fn name(self) -> &'static str {
        match self {
            OptionalFieldPolicy::CheapOnly => "cheap-only",
            OptionalFieldPolicy::Always => "always",
            OptionalFieldPolicy::Never => "never",
        }
    }
}

impl fmt::Display for UnionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for OptionalFieldPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for UnionPolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [UnionPolicy::FirstMember, UnionPolicy::Simplest]
            .into_iter()
            .find(|policy| policy.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownPolicy {
                kind: "union",
                value: s.to_string(),
                expected: "first-member or simplest",
            })
    }
}

impl FromStr for OptionalFieldPolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            OptionalFieldPolicy::CheapOnly,
            OptionalFieldPolicy::Always,
            OptionalFieldPolicy::Never,
        ]
        .into_iter()
        .find(|policy| policy.name().eq_ignore_ascii_case(s))
        .ok_or_else(|| UnknownPolicy {
            kind: "optional-field",
            value: s.to_string(),
            expected: "cheap-only, always or never",
        })
    }
}

#[cfg(test)]
#[path = "../tests/policy_tests.rs"]
mod policy_tests;
