//! JavaScript source text for example values.
//!
//! The output of [`to_source`] is a single expression that evaluates to the
//! value with nothing but the global built-ins in scope. It is spliced into
//! generated bootstrap scripts, so string contents are escaped for both
//! JavaScript and the surrounding `<script>` element.

use std::fmt::Write;

use serde::Serialize;
use tspreview_syntax::scanner::{is_identifier_part_byte, is_identifier_start_byte};
use tspreview_syntax::syntax_kind::is_reserved_word;
use tspreview_types::{PromiseValue, SerializableValue};

/// Expression standing for a value that could not be synthesized.
pub const UNKNOWN_SYMBOL: &str = "Symbol.for(\"tspreview:unknown\")";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedSource {
    pub code: String,
    /// Top-level object fields that received callback placeholders.
    pub callback_fields: Vec<String>,
}

pub fn to_source(value: &SerializableValue) -> SerializedSource {
    let callback_fields = match value {
        SerializableValue::Object(fields) => fields
            .iter()
            .filter(|(_, value)| is_placeholder_callback(value))
            .map(|(name, _)| name.clone())
            .collect(),
        _ => Vec::new(),
    };
    let mut writer = SourceWriter::default();
    writer.emit_value(value);
    SerializedSource {
        code: writer.finish(),
        callback_fields,
    }
}

pub(crate) fn is_placeholder_callback(value: &SerializableValue) -> bool {
    matches!(value, SerializableValue::Function { source: None })
}

/// Accumulates expression text. `path` is the field path of the value being
/// written; callback placeholders report it when invoked.
#[derive(Default)]
pub(crate) struct SourceWriter {
    out: String,
    path: Vec<PathSegment>,
}

enum PathSegment {
    Field(String),
    Index(usize),
}

impl SourceWriter {
    pub(crate) fn finish(self) -> String {
        self.out
    }

    pub(crate) fn write(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn write_char(&mut self, ch: char) {
        self.out.push(ch);
    }

    pub(crate) fn emit_value(&mut self, value: &SerializableValue) {
        match value {
            SerializableValue::Undefined => self.write("undefined"),
            SerializableValue::Null => self.write("null"),
            SerializableValue::Boolean(value) => self.write(if *value { "true" } else { "false" }),
            SerializableValue::Number(value) => self.emit_number(*value),
            SerializableValue::String(value) => self.emit_string_literal(value),
            SerializableValue::Array(items) => self.emit_items(items),
            SerializableValue::Set(items) => {
                if items.is_empty() {
                    self.write("new Set()");
                } else {
                    self.write("new Set(");
                    self.emit_items(items);
                    self.write_char(')');
                }
            }
            SerializableValue::Object(fields) => {
                if fields.is_empty() {
                    self.write("{}");
                    return;
                }
                self.write("{ ");
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.emit_property_name(name);
                    self.write(": ");
                    self.path.push(PathSegment::Field(name.clone()));
                    self.emit_value(value);
                    self.path.pop();
                }
                self.write(" }");
            }
            SerializableValue::Map(entries) => {
                if entries.is_empty() {
                    self.write("new Map()");
                    return;
                }
                self.write("new Map([");
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.write_char('[');
                    self.emit_value(key);
                    self.write(", ");
                    self.path.push(PathSegment::Index(i));
                    self.emit_value(value);
                    self.path.pop();
                    self.write_char(']');
                }
                self.write("])");
            }
            SerializableValue::Promise(PromiseValue::Resolved(value)) => {
                self.write("Promise.resolve(");
                self.emit_value(value);
                self.write_char(')');
            }
            SerializableValue::Promise(PromiseValue::Rejected) => self.write("Promise.reject()"),
            SerializableValue::Function {
                source: Some(source),
            } => {
                self.write_char('(');
                self.write(source);
                self.write_char(')');
            }
            SerializableValue::Function { source: None } => self.emit_callback_placeholder(),
            SerializableValue::Unknown => self.write(UNKNOWN_SYMBOL),
            SerializableValue::Recursive { .. } => self.write("undefined"),
        }
    }

    fn emit_items(&mut self, items: &[SerializableValue]) {
        self.write_char('[');
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.path.push(PathSegment::Index(i));
            self.emit_value(item);
            self.path.pop();
        }
        self.write_char(']');
    }

    /// `(...args) => console.log("onClick", ...args)`
    fn emit_callback_placeholder(&mut self) {
        let path = self.path_text();
        self.write("(...args) => console.log(");
        self.emit_string_literal(&path);
        self.write(", ...args)");
    }

    fn path_text(&self) -> String {
        let mut text = String::new();
        for segment in &self.path {
            match segment {
                PathSegment::Field(name) => {
                    if !text.is_empty() {
                        text.push('.');
                    }
                    text.push_str(name);
                }
                PathSegment::Index(index) => {
                    let _ = write!(text, "[{index}]");
                }
            }
        }
        if text.is_empty() {
            text.push_str("callback");
        }
        text
    }

    fn emit_number(&mut self, value: f64) {
        if value.is_nan() {
            self.write("NaN");
        } else if value.is_infinite() {
            self.write(if value > 0.0 { "Infinity" } else { "-Infinity" });
        } else if value == 0.0 && value.is_sign_negative() {
            self.write("-0");
        } else {
            let _ = write!(self.out, "{value}");
        }
    }

    pub(crate) fn emit_property_name(&mut self, name: &str) {
        // A plain or quoted `__proto__` key sets the prototype instead of
        // creating an own property.
        if name == "__proto__" {
            self.write_char('[');
            self.emit_string_literal(name);
            self.write_char(']');
        } else if is_valid_identifier_name(name) {
            self.write(name);
        } else {
            self.emit_string_literal(name);
        }
    }

    pub(crate) fn emit_string_literal(&mut self, text: &str) {
        self.write_char('"');
        self.emit_escaped_string(text);
        self.write_char('"');
    }

    /// JSON escapes plus the two line terminators JSON allows but older
    /// JavaScript engines do not, and `</` so a value cannot close the
    /// enclosing `<script>` element.
    fn emit_escaped_string(&mut self, s: &str) {
        let mut previous = None;
        for ch in s.chars() {
            match ch {
                '"' => self.write("\\\""),
                '\\' => self.write("\\\\"),
                '\n' => self.write("\\n"),
                '\r' => self.write("\\r"),
                '\t' => self.write("\\t"),
                '\u{8}' => self.write("\\b"),
                '\u{c}' => self.write("\\f"),
                '\u{2028}' => self.write("\\u2028"),
                '\u{2029}' => self.write("\\u2029"),
                '/' if previous == Some('<') => self.write("\\/"),
                c if (c as u32) < 0x20 || c == '\x7F' => {
                    let _ = write!(self.out, "\\u{:04X}", c as u32);
                }
                c => self.write_char(c),
            }
            previous = Some(ch);
        }
    }
}

/// Keys written bare: ASCII identifiers that are not reserved words.
pub(crate) fn is_valid_identifier_name(name: &str) -> bool {
    let mut bytes = name.bytes();
    let Some(first) = bytes.next() else {
        return false;
    };
    is_identifier_start_byte(first)
        && bytes.all(is_identifier_part_byte)
        && !is_reserved_word(name)
}

#[cfg(test)]
#[path = "../tests/serialize_tests.rs"]
mod serialize_tests;
