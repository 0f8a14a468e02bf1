use super::*;

#[test]
fn callbacks_are_split_from_properties() {
    let mut fields = IndexMap::new();
    fields.insert("label".to_string(), SerializableValue::string(""));
    fields.insert("onClick".to_string(), SerializableValue::function());
    fields.insert(
        "onHover".to_string(),
        SerializableValue::Function {
            source: Some("() => {}".into()),
        },
    );
    let snippet = generate_props_assignment(&SerializableValue::Object(fields));
    assert_eq!(
        snippet,
        "const autogenCallbackProps = { onClick: (...args) => console.log(\"onClick\", ...args) };\n\
         const properties = { label: \"\", onHover: (() => {}) };\n"
    );
}

#[test]
fn empty_props() {
    assert_eq!(
        generate_props_assignment(&SerializableValue::empty_object()),
        "const autogenCallbackProps = {};\nconst properties = {};\n"
    );
}

#[test]
fn non_object_values_become_properties() {
    assert_eq!(
        generate_props_assignment(&SerializableValue::Unknown),
        "const autogenCallbackProps = {};\nconst properties = Symbol.for(\"tspreview:unknown\");\n"
    );
}

#[test]
fn snippet_parses_as_two_declarations() {
    let mut fields = IndexMap::new();
    fields.insert("onClick".to_string(), SerializableValue::function());
    fields.insert("title".to_string(), SerializableValue::string("</script>"));
    let snippet = generate_props_assignment(&SerializableValue::Object(fields));
    let (file, diagnostics) = tspreview_syntax::parse_file("bootstrap.js", &snippet);
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    assert_eq!(file.statements.len(), 2);
    assert!(!snippet.contains("</script>"));
}
