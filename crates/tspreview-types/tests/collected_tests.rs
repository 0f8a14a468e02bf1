use super::*;
use crate::value_type::Fields;

fn tree() -> ValueType {
    let mut fields = Fields::new();
    fields.insert("value".into(), ValueType::String);
    fields.insert("children".into(), ValueType::array(ValueType::name("Tree")));
    ValueType::object(fields)
}

#[test]
fn first_registration_wins() {
    let mut collected = CollectedTypes::new();
    assert!(collected.insert("Tree", tree()));
    assert!(!collected.insert("Tree", ValueType::String));
    assert_eq!(collected.get("Tree"), Some(&tree()));
    assert_eq!(collected.len(), 1);
}

#[test]
fn self_referential_entry_is_well_formed() {
    let mut collected = CollectedTypes::new();
    collected.insert("Tree", tree());
    let root = ValueType::name("Tree");
    assert!(collected.missing_references(&root).is_empty());
}

#[test]
fn missing_references_are_sorted_and_unique() {
    let mut collected = CollectedTypes::new();
    collected.insert(
        "A",
        ValueType::union([ValueType::name("Z"), ValueType::name("B")]),
    );
    let root = ValueType::array(ValueType::name("A"));
    assert_eq!(collected.missing_references(&root), vec!["B", "Z"]);
}

#[test]
fn retain_reachable_drops_unused_entries() {
    let mut collected: CollectedTypes = [
        ("Tree".to_string(), tree()),
        ("Orphan".to_string(), ValueType::Number),
        ("Leaf".to_string(), ValueType::Boolean),
    ]
    .into_iter()
    .collect();
    collected.retain_reachable(&ValueType::name("Tree"));
    assert_eq!(collected.names().collect::<Vec<_>>(), vec!["Tree"]);
}

#[test]
fn extend_keeps_existing_entries() {
    let mut left = CollectedTypes::new();
    left.insert("A", ValueType::String);
    let mut right = CollectedTypes::new();
    right.insert("A", ValueType::Number);
    right.insert("B", ValueType::Boolean);
    left.extend(right);
    assert_eq!(left.get("A"), Some(&ValueType::String));
    assert_eq!(left.get("B"), Some(&ValueType::Boolean));
}

#[test]
fn serializes_as_plain_map() {
    let mut collected = CollectedTypes::new();
    collected.insert("Id", ValueType::String);
    let json = serde_json::to_value(&collected).expect("serialize");
    assert_eq!(json, serde_json::json!({ "Id": { "kind": "string" } }));
}
