use super::*;

#[test]
fn defaults() {
    let policy = SynthesisPolicy::default();
    assert_eq!(policy.union, UnionPolicy::FirstMember);
    assert_eq!(policy.optional_fields, OptionalFieldPolicy::CheapOnly);
}

#[test]
fn parse_names() {
    assert_eq!("simplest".parse::<UnionPolicy>().unwrap(), UnionPolicy::Simplest);
    assert_eq!("First-Member".parse::<UnionPolicy>().unwrap(), UnionPolicy::FirstMember);
    assert_eq!("always".parse::<OptionalFieldPolicy>().unwrap(), OptionalFieldPolicy::Always);
    let err = "random".parse::<UnionPolicy>().unwrap_err();
    assert_eq!(
        err.to_string(),
        "unknown union policy `random` (expected first-member or simplest)"
    );
}

#[test]
fn deserializes_with_defaults_for_missing_fields() {
    let policy: SynthesisPolicy = serde_json::from_str(r#"{ "union": "simplest" }"#).unwrap();
    assert_eq!(policy.union, UnionPolicy::Simplest);
    assert_eq!(policy.optional_fields, OptionalFieldPolicy::CheapOnly);
    assert_eq!(
        serde_json::to_string(&SynthesisPolicy::default()).unwrap(),
        r#"{"union":"first-member","optionalFields":"cheap-only"}"#
    );
}
