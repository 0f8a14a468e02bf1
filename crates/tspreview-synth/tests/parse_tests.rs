use super::*;

fn parse(text: &str) -> SerializableValue {
    parse_value_source(text).unwrap()
}

#[test]
fn literals() {
    assert_eq!(parse("\"a\""), SerializableValue::string("a"));
    assert_eq!(parse("`plain`"), SerializableValue::string("plain"));
    assert_eq!(parse("-3"), SerializableValue::Number(-3.0));
    assert_eq!(parse("+3"), SerializableValue::Number(3.0));
    assert_eq!(parse("!true"), SerializableValue::Boolean(false));
    assert_eq!(parse("null"), SerializableValue::Null);
    assert_eq!(parse("undefined"), SerializableValue::Undefined);
    assert_eq!(parse("void 0"), SerializableValue::Undefined);
    assert_eq!(parse("Infinity"), SerializableValue::Number(f64::INFINITY));
    assert!(matches!(parse("NaN"), SerializableValue::Number(n) if n.is_nan()));
}

#[test]
fn story_args_object() {
    let value = parse(
        "{ label: 'Hello', size: 2, tags: ['a', 'b'], 'data-x': true, nested: { on: false } } as const",
    );
    let fields = value.as_object().unwrap();
    assert_eq!(
        fields.keys().collect::<Vec<_>>(),
        vec!["label", "size", "tags", "data-x", "nested"]
    );
    assert_eq!(
        fields["tags"],
        SerializableValue::Array(vec![SerializableValue::string("a"), SerializableValue::string("b")])
    );
}

#[test]
fn non_static_parts_degrade() {
    let value = parse("{ ...base, [key]: 1, user, total: a + b, title: `Hi ${name}`, ok: 1 }");
    let fields = value.as_object().unwrap();
    assert_eq!(fields.keys().collect::<Vec<_>>(), vec!["user", "total", "title", "ok"]);
    assert_eq!(fields["user"], SerializableValue::Unknown);
    assert_eq!(fields["total"], SerializableValue::Unknown);
    assert_eq!(fields["title"], SerializableValue::Unknown);
    assert_eq!(fields["ok"], SerializableValue::Number(1.0));
}

#[test]
fn functions_keep_source_text() {
    let value = parse("{ onClick: () => console.log('x'), onHover: function () {}, onKey() {} }");
    let fields = value.as_object().unwrap();
    assert_eq!(
        fields["onClick"],
        SerializableValue::Function {
            source: Some("() => console.log('x')".into())
        }
    );
    assert_eq!(
        fields["onHover"],
        SerializableValue::Function {
            source: Some("function () {}".into())
        }
    );
    assert_eq!(fields["onKey"], SerializableValue::function());
}

#[test]
fn constructors_and_promises() {
    assert_eq!(
        parse("new Map([['a', 1], ['b', 2]])"),
        SerializableValue::Map(vec![
            (SerializableValue::string("a"), SerializableValue::Number(1.0)),
            (SerializableValue::string("b"), SerializableValue::Number(2.0)),
        ])
    );
    assert_eq!(parse("new Map()"), SerializableValue::Map(Vec::new()));
    assert_eq!(
        parse("new Set([1])"),
        SerializableValue::Set(vec![SerializableValue::Number(1.0)])
    );
    assert_eq!(
        parse("Promise.resolve(5)"),
        SerializableValue::resolved(SerializableValue::Number(5.0))
    );
    assert_eq!(
        parse("Promise.resolve()"),
        SerializableValue::resolved(SerializableValue::Undefined)
    );
    assert_eq!(parse("Promise.reject(new Error('x'))"), SerializableValue::rejected());
    assert_eq!(parse(UNKNOWN), SerializableValue::Unknown);
    assert_eq!(parse("new Date()"), SerializableValue::Unknown);
    assert_eq!(parse("someCall()"), SerializableValue::Unknown);
}

const UNKNOWN: &str = crate::serialize::UNKNOWN_SYMBOL;

#[test]
fn syntax_errors_are_reported() {
    assert!(matches!(
        parse_value_source("{ a: "),
        Err(ParseValueError::Syntax(_))
    ));
}
