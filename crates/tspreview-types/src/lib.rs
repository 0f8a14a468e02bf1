//! Portable intermediate representations shared by the resolver, the value
//! synthesizer and the serializer.
//!
//! - [`ValueType`]: resolved shape of a type, with recursion broken through
//!   [`CollectedTypes`].
//! - [`SerializableValue`]: an example value for a [`ValueType`].

pub mod collected;
pub mod value;
pub mod value_type;

pub use collected::CollectedTypes;
pub use value::{PromiseValue, SerializableValue};
pub use value_type::{EnumValue, Fields, LiteralValue, ValueType};
