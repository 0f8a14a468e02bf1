//! Values written as source: story `args` literals and serialized values.

use indexmap::IndexMap;
use thiserror::Error;
use tspreview_syntax::ast::{
    ArrayElement, ExprKind, Expression, ObjectProperty, PropertyName, UnaryOp,
};
use tspreview_syntax::{ByteSpan, parse_expression};
use tspreview_types::SerializableValue;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseValueError {
    #[error("invalid value expression: {0}")]
    Syntax(String),
}

/// Parse `text` as an expression and convert it.
pub fn parse_value_source(text: &str) -> Result<SerializableValue, ParseValueError> {
    let parsed = parse_expression(text).map_err(|diagnostics| {
        let message = diagnostics
            .first()
            .map(|diagnostic| diagnostic.message_text.clone())
            .unwrap_or_default();
        ParseValueError::Syntax(message)
    })?;
    Ok(parse_serializable_value(&parsed.expr, &parsed.text))
}

/// Convert an expression to a value. `source` is the text the expression's
/// spans point into; functions keep their source text.
///
/// Shapes that have no static value (identifiers, calls, spreads, computed
/// keys other than string literals) become [`SerializableValue::Unknown`] or
/// are skipped inside objects.
pub fn parse_serializable_value(expr: &Expression, source: &str) -> SerializableValue {
    let expr = expr.skip_outer();
    match &expr.kind {
        ExprKind::Null => SerializableValue::Null,
        ExprKind::Boolean(value) => SerializableValue::Boolean(*value),
        ExprKind::Number(value) => SerializableValue::Number(*value),
        ExprKind::String(value) | ExprKind::NoSubstitutionTemplate(value) => {
            SerializableValue::string(value.clone())
        }
        ExprKind::Identifier(name) => match name.as_str() {
            "undefined" => SerializableValue::Undefined,
            "NaN" => SerializableValue::Number(f64::NAN),
            "Infinity" => SerializableValue::Number(f64::INFINITY),
            _ => SerializableValue::Unknown,
        },
        ExprKind::Unary { op, operand } => match (op, parse_serializable_value(operand, source)) {
            (UnaryOp::Minus, SerializableValue::Number(value)) => SerializableValue::Number(-value),
            (UnaryOp::Plus, SerializableValue::Number(value)) => SerializableValue::Number(value),
            (UnaryOp::Not, SerializableValue::Boolean(value)) => SerializableValue::Boolean(!value),
            (UnaryOp::Void, _) => SerializableValue::Undefined,
            _ => SerializableValue::Unknown,
        },
        ExprKind::Array(elements) => SerializableValue::Array(array_items(elements, source)),
        ExprKind::Object(properties) => {
            let mut fields = IndexMap::new();
            for property in properties {
                match property {
                    ObjectProperty::KeyValue { key, value } => {
                        if let Some(key) = static_key(key) {
                            fields.insert(key, parse_serializable_value(value, source));
                        }
                    }
                    // Method shorthand is not an expression on its own.
                    ObjectProperty::Method { key, .. } => {
                        if let Some(key) = static_key(key) {
                            fields.insert(key, SerializableValue::function());
                        }
                    }
                    ObjectProperty::Shorthand(ident) => {
                        let value = match ident.name.as_str() {
                            "undefined" => SerializableValue::Undefined,
                            _ => SerializableValue::Unknown,
                        };
                        fields.insert(ident.name.clone(), value);
                    }
                    ObjectProperty::Spread(_)
                    | ObjectProperty::Getter { .. }
                    | ObjectProperty::Setter { .. } => {}
                }
            }
            SerializableValue::Object(fields)
        }
        ExprKind::Arrow(_) | ExprKind::Function(_) => function_source(expr.span, source),
        ExprKind::New { callee, args, .. } => match callee.as_identifier() {
            Some("Map") => SerializableValue::Map(map_entries(args.first(), source)),
            Some("Set") => SerializableValue::Set(match args.first() {
                Some(ArrayElement::Expr(items)) => match &items.skip_outer().kind {
                    ExprKind::Array(elements) => array_items(elements, source),
                    _ => Vec::new(),
                },
                _ => Vec::new(),
            }),
            _ => SerializableValue::Unknown,
        },
        ExprKind::Call { callee, args, .. } => {
            let first_arg = match args.first() {
                Some(ArrayElement::Expr(arg)) => Some(arg),
                _ => None,
            };
            match callee.entity_text().as_deref() {
                Some("Promise.resolve") => SerializableValue::resolved(
                    first_arg
                        .map(|arg| parse_serializable_value(arg, source))
                        .unwrap_or(SerializableValue::Undefined),
                ),
                Some("Promise.reject") => SerializableValue::rejected(),
                Some("Symbol.for") => SerializableValue::Unknown,
                _ => SerializableValue::Unknown,
            }
        }
        _ => SerializableValue::Unknown,
    }
}

/// Key text, including computed keys written as a string literal
/// (`["__proto__"]`).
fn static_key(key: &PropertyName) -> Option<String> {
    match key {
        PropertyName::Computed(expr) => match &expr.skip_outer().kind {
            ExprKind::String(value) | ExprKind::NoSubstitutionTemplate(value) => Some(value.clone()),
            _ => None,
        },
        _ => key.as_text(),
    }
}

fn array_items(elements: &[ArrayElement], source: &str) -> Vec<SerializableValue> {
    elements
        .iter()
        .filter_map(|element| match element {
            ArrayElement::Expr(item) => Some(parse_serializable_value(item, source)),
            ArrayElement::Hole => Some(SerializableValue::Undefined),
            ArrayElement::Spread(_) => None,
        })
        .collect()
}

/// Entries of `new Map([[k, v], ...])`; malformed entries are skipped.
fn map_entries(
    arg: Option<&ArrayElement>,
    source: &str,
) -> Vec<(SerializableValue, SerializableValue)> {
    let Some(ArrayElement::Expr(entries)) = arg else {
        return Vec::new();
    };
    let ExprKind::Array(entries) = &entries.skip_outer().kind else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| {
            let ArrayElement::Expr(entry) = entry else {
                return None;
            };
            match &entry.skip_outer().kind {
                ExprKind::Array(pair) => match pair.as_slice() {
                    [ArrayElement::Expr(key), ArrayElement::Expr(value)] => Some((
                        parse_serializable_value(key, source),
                        parse_serializable_value(value, source),
                    )),
                    _ => None,
                },
                _ => None,
            }
        })
        .collect()
}

fn function_source(span: ByteSpan, source: &str) -> SerializableValue {
    let text = span.slice(source).trim();
    SerializableValue::Function {
        source: (!text.is_empty()).then(|| text.to_string()),
    }
}

#[cfg(test)]
#[path = "../tests/parse_tests.rs"]
mod parse_tests;
