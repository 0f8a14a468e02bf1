use super::*;

fn fields(entries: &[(&str, ValueType)]) -> Fields {
    entries
        .iter()
        .map(|(name, ty)| (name.to_string(), ty.clone()))
        .collect()
}

#[test]
fn union_flattens_and_dedupes() {
    let inner = ValueType::union([ValueType::String, ValueType::Number]);
    let ty = ValueType::union([inner, ValueType::String, ValueType::Boolean]);
    assert_eq!(
        ty,
        ValueType::Union {
            types: vec![ValueType::String, ValueType::Number, ValueType::Boolean]
        }
    );
}

#[test]
fn union_drops_never_and_collapses_single_member() {
    assert_eq!(
        ValueType::union([ValueType::Never, ValueType::String]),
        ValueType::String
    );
    assert_eq!(ValueType::union([]), ValueType::Never);
    assert_eq!(
        ValueType::union([ValueType::Never, ValueType::Never]),
        ValueType::Never
    );
}

#[test]
fn union_keeps_literal_order() {
    let ty = ValueType::union([
        ValueType::string_literal("primary"),
        ValueType::string_literal("secondary"),
        ValueType::string_literal("primary"),
    ]);
    assert_eq!(ty.to_string(), r#""primary" | "secondary""#);
}

#[test]
fn intersection_merges_objects_at_first_position() {
    let a = ValueType::object(fields(&[("a", ValueType::String)]));
    let b = ValueType::object(fields(&[("b", ValueType::Number)]));
    let ty = ValueType::intersection([a, ValueType::Unknown, b]);
    let merged = ty.fields().expect("merged object");
    assert_eq!(merged.keys().collect::<Vec<_>>(), vec!["a", "b"]);
}

#[test]
fn intersection_shared_field_optional_only_if_both_optional() {
    let a = ValueType::object(fields(&[
        ("x", ValueType::optional(ValueType::String)),
        ("y", ValueType::optional(ValueType::Number)),
    ]));
    let b = ValueType::object(fields(&[
        ("x", ValueType::String),
        ("y", ValueType::optional(ValueType::Number)),
    ]));
    let ty = ValueType::intersection([a, b]);
    let merged = ty.fields().expect("merged object");
    assert_eq!(merged["x"], ValueType::String);
    assert_eq!(merged["y"], ValueType::optional(ValueType::Number));
}

#[test]
fn intersection_never_wins_and_empty_is_unknown() {
    assert_eq!(
        ValueType::intersection([ValueType::String, ValueType::Never]),
        ValueType::Never
    );
    assert_eq!(ValueType::intersection([]), ValueType::Unknown);
    assert_eq!(
        ValueType::intersection([ValueType::Any, ValueType::String]),
        ValueType::String
    );
}

#[test]
fn intersection_keeps_non_object_members() {
    let ty = ValueType::intersection([ValueType::String, ValueType::name("Brand")]);
    assert!(matches!(ty, ValueType::Intersection { ref types } if types.len() == 2));
}

#[test]
fn optional_is_never_wrapped_twice() {
    let once = ValueType::optional(ValueType::String);
    let twice = ValueType::optional(once.clone());
    assert_eq!(once, twice);
    assert!(twice.is_optional());
    assert_eq!(twice.strip_optional(), &ValueType::String);
    assert_eq!(twice.into_required(), ValueType::String);
}

#[test]
fn callable_ignores_nullish_members() {
    let handler = ValueType::optional(ValueType::union([ValueType::Function, ValueType::Null]));
    assert!(handler.is_callable());
    assert!(!ValueType::union([ValueType::Function, ValueType::String]).is_callable());
    assert!(!ValueType::union([ValueType::Null, ValueType::Undefined]).is_callable());
}

#[test]
fn scalar_detection() {
    assert!(ValueType::optional(ValueType::Boolean).is_scalar());
    assert!(
        ValueType::union([ValueType::string_literal("sm"), ValueType::string_literal("lg")])
            .is_scalar()
    );
    assert!(!ValueType::array(ValueType::String).is_scalar());
    assert!(!ValueType::empty_object().is_scalar());
}

#[test]
fn referenced_names_walks_every_position() {
    let ty = ValueType::object(fields(&[
        ("children", ValueType::array(ValueType::name("Tree"))),
        (
            "lookup",
            ValueType::map(ValueType::String, ValueType::name("Leaf")),
        ),
        ("next", ValueType::optional(ValueType::name("Tree"))),
    ]));
    assert_eq!(ty.referenced_names(), vec!["Tree", "Leaf", "Tree"]);
}

#[test]
fn display_renders_typescript_like_text() {
    let ty = ValueType::object(fields(&[
        ("label", ValueType::String),
        ("onClick", ValueType::optional(ValueType::Function)),
        (
            "items",
            ValueType::array(ValueType::union([ValueType::String, ValueType::Number])),
        ),
    ]));
    assert_eq!(
        ty.to_string(),
        "{ label: string; onClick?: Function; items: (string | number)[] }"
    );
    assert_eq!(
        ValueType::record(ValueType::String, ValueType::Number).to_string(),
        "Record<string, number>"
    );
}

#[test]
fn serializes_with_kind_tag() {
    let ty = ValueType::object(fields(&[(
        "size",
        ValueType::optional(ValueType::string_literal("sm")),
    )]));
    let json = serde_json::to_value(&ty).expect("serialize");
    assert_eq!(
        json,
        serde_json::json!({
            "kind": "object",
            "fields": {
                "size": { "kind": "optional", "type": { "kind": "literal", "value": "sm" } }
            }
        })
    );
    let back: ValueType = serde_json::from_value(json).expect("deserialize");
    assert_eq!(back, ty);
}

#[test]
fn enum_values_deserialize_untagged() {
    let json = serde_json::json!({
        "kind": "enum",
        "name": "Color",
        "options": { "Red": "red", "Two": 2.0 }
    });
    let ty: ValueType = serde_json::from_value(json).expect("deserialize");
    let ValueType::Enum { options, .. } = ty else {
        panic!("expected enum");
    };
    assert_eq!(options["Red"], EnumValue::String("red".into()));
    assert_eq!(options["Two"], EnumValue::Number(2.0));
    assert_eq!(
        LiteralValue::from(options["Two"].clone()),
        LiteralValue::Number(2.0)
    );
}
