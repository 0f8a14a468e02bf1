//! The props snippet evaluated by preview renderers.
//!
//! ```js
//! const autogenCallbackProps = { onClick: (...args) => console.log("onClick", ...args) };
//! const properties = { label: "" };
//! ```
//!
//! Renderers spread both objects into the previewed component. The names of
//! the two bindings are part of the contract with the renderers.

use indexmap::IndexMap;
use tspreview_types::SerializableValue;

use crate::serialize::{SourceWriter, is_placeholder_callback};

/// Split `value` into callback placeholders and plain properties and write
/// both bindings. A non-object value becomes `properties` as a whole.
pub fn generate_props_assignment(value: &SerializableValue) -> String {
    let (callbacks, properties) = match value {
        SerializableValue::Object(fields) => {
            let (callbacks, properties): (IndexMap<_, _>, IndexMap<_, _>) = fields
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .partition(|(_, value)| is_placeholder_callback(value));
            (
                SerializableValue::Object(callbacks),
                SerializableValue::Object(properties),
            )
        }
        other => (SerializableValue::empty_object(), other.clone()),
    };

    let mut writer = SourceWriter::default();
    writer.write("const autogenCallbackProps = ");
    writer.emit_value(&callbacks);
    writer.write(";\nconst properties = ");
    writer.emit_value(&properties);
    writer.write(";\n");
    writer.finish()
}

#[cfg(test)]
#[path = "../tests/props_assignment_tests.rs"]
mod props_assignment_tests;
