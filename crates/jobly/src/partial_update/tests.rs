use super::*;
use serde_json::json;

fn aliya() -> UpdatePayload {
    UpdatePayload::new().set("firstName", "Aliya").set("age", 32)
}

#[test]
fn maps_known_fields_and_keeps_others() {
    let map = ColumnMap::from_static(&[("firstName", "first_name")]);
    let set = build_set_clause(&aliya(), &map).unwrap();

    assert_eq!(set.text, r#""first_name"=$1, "age"=$2"#);
    assert_eq!(set.values, vec![Value::from("Aliya"), Value::Int(32)]);
}

#[test]
fn empty_map_uses_field_names_verbatim() {
    let set = build_set_clause(&aliya(), &ColumnMap::IDENTITY).unwrap();

    assert_eq!(set.text, r#""firstName"=$1, "age"=$2"#);
    assert_eq!(set.values, vec![Value::from("Aliya"), Value::Int(32)]);
}

#[test]
fn empty_payload_is_validation_error() {
    let err = build_set_clause(&UpdatePayload::new(), &ColumnMap::IDENTITY).unwrap_err();
    assert!(err.is_validation());

    let map = ColumnMap::from_static(&[("firstName", "first_name")]);
    assert!(build_set_clause(&UpdatePayload::new(), &map).unwrap_err().is_validation());
}

#[test]
fn placeholder_count_matches_values() {
    let payload = UpdatePayload::from_pairs([
        ("a", Value::Int(1)),
        ("b", Value::Null),
        ("c", Value::from("x")),
        ("d", Value::Bool(true)),
    ]);
    let set = build_set_clause(&payload, &ColumnMap::IDENTITY).unwrap();

    assert_eq!(set.text.matches('$').count(), 4);
    assert_eq!(set.values.len(), payload.len());
    for (i, (_, v)) in payload.iter().enumerate() {
        assert!(set.text.contains(&format!("${}", i + 1)));
        assert_eq!(&set.values[i], v);
    }
    assert_eq!(set.next_placeholder(), 5);
}

#[test]
fn mapped_field_name_does_not_leak() {
    let map = ColumnMap::from_static(&[("companyHandle", "company_handle")]);
    let payload = UpdatePayload::new().set("companyHandle", "c1");
    let set = build_set_clause(&payload, &map).unwrap();

    assert!(set.text.contains(r#""company_handle""#));
    assert!(!set.text.contains(r#""companyHandle""#));
}

#[test]
fn repeated_field_keeps_first_position() {
    let payload = UpdatePayload::new()
        .set("title", "a")
        .set("salary", 1)
        .set("title", "b");
    let set = build_set_clause(&payload, &ColumnMap::IDENTITY).unwrap();

    assert_eq!(set.text, r#""title"=$1, "salary"=$2"#);
    assert_eq!(set.values, vec![Value::from("b"), Value::Int(1)]);
}

#[test]
fn values_never_appear_in_text() {
    let hostile = "'; DROP TABLE jobs;--";
    let payload = UpdatePayload::new().set("title", hostile);
    let set = build_set_clause(&payload, &ColumnMap::IDENTITY).unwrap();

    assert!(!set.text.contains(hostile));
    assert_eq!(set.values, vec![Value::from(hostile)]);
}

#[test]
fn hostile_field_name_stays_quoted() {
    let payload = UpdatePayload::new().set("x\"=1; --", 1);
    let set = build_set_clause(&payload, &ColumnMap::IDENTITY).unwrap();
    assert_eq!(set.text, r#""x""=1; --"=$1"#);
}

#[test]
fn from_json_preserves_document_order() {
    let payload =
        UpdatePayload::from_json(json!({"title": "New", "salary": 5, "equity": 0.2})).unwrap();
    assert_eq!(payload.fields().collect::<Vec<_>>(), ["title", "salary", "equity"]);

    let set = build_set_clause(&payload, &ColumnMap::IDENTITY).unwrap();
    assert_eq!(set.text, r#""title"=$1, "salary"=$2, "equity"=$3"#);
    assert_eq!(
        set.values,
        vec![Value::from("New"), Value::Int(5), Value::Float(0.2)]
    );
}

#[test]
fn from_json_rejects_non_objects_and_nested_values() {
    assert!(UpdatePayload::from_json(json!([1])).unwrap_err().is_validation());
    assert!(UpdatePayload::from_json(json!({"a": {"b": 1}})).unwrap_err().is_validation());
}

#[test]
fn from_json_empty_object_then_build_fails() {
    let payload = UpdatePayload::from_json(json!({})).unwrap();
    assert!(payload.is_empty());
    assert!(build_set_clause(&payload, &ColumnMap::IDENTITY).unwrap_err().is_validation());
}
