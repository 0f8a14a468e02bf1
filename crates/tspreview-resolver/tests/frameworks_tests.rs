use super::*;

#[test]
fn test_parse_and_display() {
    assert_eq!("react".parse::<Framework>().unwrap(), Framework::React);
    assert_eq!("Svelte".parse::<Framework>().unwrap(), Framework::Svelte);
    assert!("angular".parse::<Framework>().is_err());
    assert_eq!(Framework::Solid.to_string(), "solid");
}

#[test]
fn test_react_table() {
    let overrides = Framework::React.overrides();
    let node = overrides.apply("react.ReactNode", &[]).unwrap();
    assert!(matches!(node, ValueType::Union { ref types } if types[0] == ValueType::String));
    assert_eq!(overrides.apply("react.FC", &[]), Some(ValueType::Function));
    assert_eq!(overrides.apply("JSX.Element", &[]), Some(ValueType::Null));
}

#[test]
fn test_props_with_children_merges_into_the_argument() {
    let overrides = Framework::React.overrides();
    let mut fields = Fields::new();
    fields.insert("label".into(), ValueType::String);
    let merged = overrides
        .apply("react.PropsWithChildren", &[ValueType::object(fields)])
        .unwrap();
    let fields = merged.fields().unwrap();
    assert_eq!(fields.keys().collect::<Vec<_>>(), vec!["label", "children"]);
    assert!(fields["children"].is_optional());
}

#[test]
fn test_tables_are_distinct() {
    let vue = Framework::Vue.overrides();
    assert!(vue.contains("vue.Ref"));
    assert!(!vue.contains("react.ReactNode"));
    let solid = Framework::Solid.overrides();
    assert!(matches!(
        solid.apply("JSX.Element", &[]),
        Some(ValueType::Union { .. })
    ));
    assert_eq!(Framework::Svelte.jsx_module(), None);
}
