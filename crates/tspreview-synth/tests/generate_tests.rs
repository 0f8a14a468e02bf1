use super::*;
use tspreview_types::{Fields, PromiseValue};

use crate::policy::OptionalFieldPolicy;

fn object(fields: &[(&str, ValueType)]) -> ValueType {
    ValueType::object(
        fields
            .iter()
            .map(|(name, ty)| (name.to_string(), ty.clone()))
            .collect::<Fields>(),
    )
}

fn values(fields: &[(&str, SerializableValue)]) -> SerializableValue {
    SerializableValue::Object(
        fields
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect(),
    )
}

fn synthesize_with(ty: &ValueType, collected: &CollectedTypes, policy: SynthesisPolicy) -> SerializableValue {
    ValueSynthesizer::new(collected, policy).generate(ty)
}

#[test]
fn primitives_get_canonical_values() {
    let collected = CollectedTypes::new();
    assert_eq!(generate(&ValueType::String, &collected), SerializableValue::string(""));
    assert_eq!(generate(&ValueType::Number, &collected), SerializableValue::Number(0.0));
    assert_eq!(generate(&ValueType::Boolean, &collected), SerializableValue::Boolean(false));
    assert_eq!(generate(&ValueType::Null, &collected), SerializableValue::Null);
    assert_eq!(generate(&ValueType::Undefined, &collected), SerializableValue::Undefined);
    assert_eq!(generate(&ValueType::Void, &collected), SerializableValue::Undefined);
    for opaque in [ValueType::Any, ValueType::Unknown, ValueType::Never] {
        assert_eq!(generate(&opaque, &collected), SerializableValue::Unknown);
    }
    assert_eq!(
        generate(&ValueType::string_literal("primary"), &collected),
        SerializableValue::string("primary")
    );
    assert_eq!(
        generate(&ValueType::boolean_literal(true), &collected),
        SerializableValue::Boolean(true)
    );
}

#[test]
fn label_and_callback_props() {
    let ty = object(&[("label", ValueType::String), ("onClick", ValueType::Function)]);
    assert_eq!(
        generate(&ty, &CollectedTypes::new()),
        values(&[
            ("label", SerializableValue::string("")),
            ("onClick", SerializableValue::function()),
        ])
    );
}

#[test]
fn collections_get_exactly_one_item() {
    let collected = CollectedTypes::new();
    let ty = object(&[
        ("items", ValueType::array(ValueType::String)),
        ("tags", ValueType::set(ValueType::Number)),
        ("pair", ValueType::tuple(vec![ValueType::String, ValueType::Boolean])),
        ("lookup", ValueType::map(ValueType::String, ValueType::Number)),
        ("dict", ValueType::record(ValueType::String, ValueType::Number)),
        ("later", ValueType::promise(ValueType::Number)),
    ]);
    let value = generate(&ty, &collected);
    let fields = value.as_object().unwrap();
    assert_eq!(fields["items"], SerializableValue::Array(vec![SerializableValue::string("")]));
    assert_eq!(fields["tags"], SerializableValue::Set(vec![SerializableValue::Number(0.0)]));
    assert_eq!(
        fields["pair"],
        SerializableValue::Array(vec![
            SerializableValue::string(""),
            SerializableValue::Boolean(false)
        ])
    );
    assert_eq!(fields["lookup"], SerializableValue::Map(Vec::new()));
    assert_eq!(fields["dict"], SerializableValue::empty_object());
    assert_eq!(
        fields["later"],
        SerializableValue::Promise(PromiseValue::Resolved(Box::new(SerializableValue::Number(0.0))))
    );
}

#[test]
fn union_takes_the_first_member() {
    let collected = CollectedTypes::new();
    let a = object(&[("kind", ValueType::string_literal("a"))]);
    let b = ValueType::Number;
    let union = ValueType::union([a.clone(), b]);
    assert_eq!(generate(&union, &collected), generate(&a, &collected));
}

#[test]
fn simplest_union_policy_prefers_cheap_members() {
    let collected = CollectedTypes::new();
    let policy = SynthesisPolicy::default().with_union(UnionPolicy::Simplest);
    let union = ValueType::union([
        object(&[("id", ValueType::String)]),
        ValueType::Null,
    ]);
    assert_eq!(synthesize_with(&union, &collected, policy), SerializableValue::Null);

    let tie = ValueType::union([ValueType::string_literal("sm"), ValueType::string_literal("lg")]);
    assert_eq!(synthesize_with(&tie, &collected, policy), SerializableValue::string("sm"));
}

#[test]
fn optional_fields_follow_the_policy() {
    let collected = CollectedTypes::new();
    let ty = object(&[
        ("title", ValueType::String),
        ("size", ValueType::optional(ValueType::Number)),
        ("config", ValueType::optional(object(&[("deep", ValueType::Boolean)]))),
        ("onClose", ValueType::optional(ValueType::Function)),
        (
            "onOpen",
            ValueType::optional(ValueType::union([ValueType::Function, ValueType::Undefined])),
        ),
    ]);

    let cheap = generate(&ty, &collected);
    assert_eq!(
        cheap.as_object().unwrap().keys().collect::<Vec<_>>(),
        vec!["title", "size", "onClose", "onOpen"]
    );
    assert!(cheap.as_object().unwrap()["onOpen"].is_function());

    let always = synthesize_with(
        &ty,
        &collected,
        SynthesisPolicy::default().with_optional_fields(OptionalFieldPolicy::Always),
    );
    assert_eq!(always.as_object().unwrap().len(), 5);
    assert_eq!(
        always.as_object().unwrap()["config"],
        values(&[("deep", SerializableValue::Boolean(false))])
    );

    let never = synthesize_with(
        &ty,
        &collected,
        SynthesisPolicy::default().with_optional_fields(OptionalFieldPolicy::Never),
    );
    assert_eq!(
        never.as_object().unwrap().keys().collect::<Vec<_>>(),
        vec!["title", "onClose", "onOpen"]
    );
}

#[test]
fn enums_take_their_first_option() {
    let mut options = indexmap::IndexMap::new();
    options.insert("Small".to_string(), EnumValue::String("sm".into()));
    options.insert("Large".to_string(), EnumValue::String("lg".into()));
    let ty = ValueType::Enum {
        name: "Size".into(),
        options,
    };
    assert_eq!(generate(&ty, &CollectedTypes::new()), SerializableValue::string("sm"));
}

#[test]
fn intersections_merge_object_members() {
    let ty = ValueType::Intersection {
        types: vec![
            object(&[("a", ValueType::String)]),
            ValueType::Function,
            object(&[("b", ValueType::Number)]),
        ],
    };
    assert_eq!(
        generate(&ty, &CollectedTypes::new()),
        values(&[
            ("a", SerializableValue::string("")),
            ("b", SerializableValue::Number(0.0)),
        ])
    );
}

#[test]
fn linked_list_cycle_is_cut_once() {
    let mut collected = CollectedTypes::new();
    collected.insert(
        "list.ts:Node",
        object(&[
            ("value", ValueType::String),
            ("next", ValueType::union([ValueType::name("list.ts:Node"), ValueType::Null])),
        ]),
    );
    let value = generate(&ValueType::name("list.ts:Node"), &collected);
    assert_eq!(
        value,
        values(&[
            ("value", SerializableValue::string("")),
            (
                "next",
                SerializableValue::Recursive {
                    name: "list.ts:Node".into()
                }
            ),
        ])
    );

    let simplest = synthesize_with(
        &ValueType::name("list.ts:Node"),
        &collected,
        SynthesisPolicy::default().with_union(UnionPolicy::Simplest),
    );
    assert!(!simplest.contains_recursive());
    assert_eq!(simplest.as_object().unwrap()["next"], SerializableValue::Null);
}

#[test]
fn tree_and_mutual_recursion_terminate() {
    let mut collected = CollectedTypes::new();
    collected.insert(
        "tree.ts:Tree",
        object(&[
            ("label", ValueType::String),
            ("children", ValueType::array(ValueType::name("tree.ts:Tree"))),
        ]),
    );
    collected.insert("ab.ts:A", object(&[("b", ValueType::name("ab.ts:B"))]));
    collected.insert("ab.ts:B", object(&[("a", ValueType::name("ab.ts:A"))]));

    let tree = generate(&ValueType::name("tree.ts:Tree"), &collected);
    assert_eq!(
        tree.as_object().unwrap()["children"],
        SerializableValue::Array(vec![SerializableValue::Recursive {
            name: "tree.ts:Tree".into()
        }])
    );

    let a = generate(&ValueType::name("ab.ts:A"), &collected);
    assert_eq!(
        a,
        values(&[(
            "b",
            values(&[(
                "a",
                SerializableValue::Recursive {
                    name: "ab.ts:A".into()
                }
            )])
        )])
    );
}

#[test]
fn missing_names_degrade_to_unknown() {
    let ty = object(&[("ok", ValueType::Number), ("broken", ValueType::name("gone.ts:Gone"))]);
    assert_eq!(
        generate(&ty, &CollectedTypes::new()),
        values(&[
            ("ok", SerializableValue::Number(0.0)),
            ("broken", SerializableValue::Unknown),
        ])
    );
}

#[test]
fn deep_nesting_degrades_instead_of_overflowing() {
    let mut ty = ValueType::String;
    for _ in 0..200 {
        ty = ValueType::array(ty);
    }
    let mut value = generate(&ty, &CollectedTypes::new());
    let mut depth = 0;
    while let SerializableValue::Array(mut items) = value {
        value = items.pop().unwrap();
        depth += 1;
    }
    assert_eq!(value, SerializableValue::Unknown);
    assert!(depth < 200);
}

#[test]
fn synthesis_is_deterministic() {
    let mut collected = CollectedTypes::new();
    collected.insert(
        "a.ts:Item",
        object(&[
            ("id", ValueType::Number),
            ("tags", ValueType::array(ValueType::String)),
            ("parent", ValueType::optional(ValueType::name("a.ts:Item"))),
        ]),
    );
    let ty = object(&[("items", ValueType::array(ValueType::name("a.ts:Item")))]);
    assert_eq!(generate(&ty, &collected), generate(&ty, &collected));
}
