//! Example values for resolved types.
//!
//! - `generate`: [`ValueSynthesizer`], from a [`ValueType`](tspreview_types::ValueType)
//!   to a [`SerializableValue`](tspreview_types::SerializableValue)
//! - `policy`: the knobs synthesis honors ([`SynthesisPolicy`])
//! - `serialize`: JavaScript expression text for a value
//! - `parse`: the reverse, for story `args` literals
//! - `props_assignment`: the bootstrap snippet a preview renderer evaluates

pub mod generate;
pub mod parse;
pub mod policy;
pub mod props_assignment;
pub mod serialize;

pub use generate::{ValueSynthesizer, generate};
pub use parse::{ParseValueError, parse_serializable_value, parse_value_source};
pub use policy::{OptionalFieldPolicy, SynthesisPolicy, UnionPolicy, UnknownPolicy};
pub use props_assignment::generate_props_assignment;
pub use serialize::{SerializedSource, UNKNOWN_SYMBOL, to_source};
