use super::*;

#[test]
fn function_placeholders_share_shape() {
    let authored = SerializableValue::Function {
        source: Some("() => alert(1)".into()),
    };
    assert!(authored.same_shape(&SerializableValue::function()));
    assert_ne!(authored, SerializableValue::function());
}

#[test]
fn nan_has_same_shape_as_itself() {
    let nan = SerializableValue::Number(f64::NAN);
    assert!(nan.same_shape(&nan.clone()));
    assert!(!SerializableValue::Number(1.0).same_shape(&SerializableValue::Number(2.0)));
}

#[test]
fn object_shape_respects_key_order() {
    let mut a = IndexMap::new();
    a.insert("x".to_string(), SerializableValue::Null);
    a.insert("y".to_string(), SerializableValue::Null);
    let mut b = IndexMap::new();
    b.insert("y".to_string(), SerializableValue::Null);
    b.insert("x".to_string(), SerializableValue::Null);
    assert!(!SerializableValue::Object(a).same_shape(&SerializableValue::Object(b)));
}

#[test]
fn contains_recursive_looks_inside_collections() {
    let value = SerializableValue::Map(vec![(
        SerializableValue::string("root"),
        SerializableValue::Array(vec![SerializableValue::Recursive {
            name: "Tree".into(),
        }]),
    )]);
    assert!(value.contains_recursive());
    assert!(!SerializableValue::resolved(SerializableValue::Null).contains_recursive());
}

#[test]
fn merge_overrides_object_fields() {
    let mut base = IndexMap::new();
    base.insert("label".to_string(), SerializableValue::string("Button"));
    base.insert("disabled".to_string(), SerializableValue::Boolean(false));
    let mut top = IndexMap::new();
    top.insert("disabled".to_string(), SerializableValue::Boolean(true));
    let merged = SerializableValue::Object(base).merged_with(SerializableValue::Object(top));
    let fields = merged.as_object().expect("object");
    assert_eq!(fields["label"], SerializableValue::string("Button"));
    assert_eq!(fields["disabled"], SerializableValue::Boolean(true));
}

#[test]
fn merge_non_object_takes_override() {
    let merged = SerializableValue::empty_object().merged_with(SerializableValue::Null);
    assert_eq!(merged, SerializableValue::Null);
}

#[test]
fn serializes_adjacently_tagged() {
    let value = SerializableValue::Array(vec![
        SerializableValue::Number(1.0),
        SerializableValue::Undefined,
        SerializableValue::rejected(),
    ]);
    let json = serde_json::to_value(&value).expect("serialize");
    assert_eq!(
        json,
        serde_json::json!({
            "kind": "array",
            "value": [
                { "kind": "number", "value": 1.0 },
                { "kind": "undefined" },
                { "kind": "promise", "value": { "state": "rejected" } }
            ]
        })
    );
    let back: SerializableValue = serde_json::from_value(json).expect("deserialize");
    assert_eq!(back, value);
}
