//! Schema inference tests

use super::*;
use crate::types::Record;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn records(values: Vec<Value>) -> Vec<Record> {
    values
        .into_iter()
        .map(|v| match v {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        })
        .collect()
}

fn id_key() -> Vec<String> {
    vec!["id".to_string()]
}

#[test]
fn test_type_merging() {
    assert_eq!(JsonType::Integer.merge_with(JsonType::Number), JsonType::Number);
    assert_eq!(JsonType::Null.merge_with(JsonType::Boolean), JsonType::Boolean);
    assert_eq!(JsonType::Boolean.merge_with(JsonType::Integer), JsonType::String);

    let merged = TypeSet::Single(JsonType::Integer).merge_with(&TypeSet::Single(JsonType::Null));
    assert_eq!(merged, TypeSet::nullable(JsonType::Integer));
    assert!(merged.is_nullable());
    assert_eq!(merged.primary(), Some(JsonType::Integer));
}

#[test]
fn test_null_observation_keeps_format() {
    let email = SchemaProperty::new(JsonType::String).with_format("email");
    let null = SchemaProperty::new(JsonType::Null);

    let merged = email.merge(&null);
    assert_eq!(merged.json_type, TypeSet::nullable(JsonType::String));
    assert_eq!(merged.format.as_deref(), Some("email"));
    assert_eq!(null.merge(&email).format.as_deref(), Some("email"));

    let plain = SchemaProperty::new(JsonType::String);
    assert_eq!(merged.merge(&plain).format, None);
}

#[test]
fn test_infer_candidate_records() {
    let schema = SchemaInferrer::infer_records(
        &records(vec![
            json!({
                "id": "1",
                "first-name": "Ada",
                "email": "ada@example.com",
                "updated-at": "2024-01-02T03:04:05.000+01:00",
                "sourced": true,
                "tags": ["a", "b"],
                "job_id": "9"
            }),
            json!({
                "id": "2",
                "first-name": "Grace",
                "email": null,
                "updated-at": "2024-01-03T00:00:00.000+01:00",
                "sourced": false,
                "tags": []
            }),
        ]),
        &id_key(),
    );

    let property = |name: &str| schema.get_property(name).unwrap();

    assert_eq!(property("id").json_type, TypeSet::Single(JsonType::String));
    assert_eq!(property("updated-at").format.as_deref(), Some("date-time"));
    assert_eq!(property("sourced").json_type, TypeSet::Single(JsonType::Boolean));
    assert_eq!(property("email").json_type, TypeSet::nullable(JsonType::String));
    assert_eq!(property("email").format.as_deref(), Some("email"));
    assert_eq!(property("job_id").json_type, TypeSet::nullable(JsonType::String));
    assert_eq!(
        property("tags").items.as_ref().unwrap().json_type.primary(),
        Some(JsonType::String)
    );

    assert!(schema.is_required("id"));
    assert!(schema.is_required("updated-at"));
    assert!(!schema.is_required("email"));
    assert!(!schema.is_required("job_id"));
}

#[test]
fn test_format_hints() {
    let schema = SchemaInferrer::infer_records(
        &records(vec![json!({
            "start": "2022-05-01",
            "url": "https://app.teamtailor.com/x",
            "plain": "hello",
            "count": 3,
            "ratio": 0.5
        })]),
        &[],
    );

    assert_eq!(schema.get_property("start").unwrap().format.as_deref(), Some("date"));
    assert_eq!(schema.get_property("url").unwrap().format.as_deref(), Some("uri"));
    assert_eq!(schema.get_property("plain").unwrap().format, None);
    assert_eq!(
        schema.get_property("count").unwrap().json_type.primary(),
        Some(JsonType::Integer)
    );
    assert_eq!(
        schema.get_property("ratio").unwrap().json_type.primary(),
        Some(JsonType::Number)
    );
}

#[test]
fn test_conflicting_formats_are_dropped() {
    let schema = SchemaInferrer::infer_records(
        &records(vec![json!({"value": "2024-01-01"}), json!({"value": "text"})]),
        &[],
    );
    assert_eq!(schema.get_property("value").unwrap().format, None);
}

#[test]
fn test_nested_objects() {
    let schema = SchemaInferrer::infer_records(
        &records(vec![
            json!({"links": {"self": "https://api.teamtailor.com/v1/jobs/1"}}),
            json!({"links": {"self": "https://api.teamtailor.com/v1/jobs/2", "extra": 1}}),
        ]),
        &[],
    );

    let nested = schema
        .get_property("links")
        .unwrap()
        .properties
        .as_ref()
        .unwrap();
    assert_eq!(nested["self"].format.as_deref(), Some("uri"));
    assert!(nested["extra"].is_nullable());
}

#[test]
fn test_max_depth() {
    let mut inferrer = SchemaInferrer::new().with_max_depth(1);
    inferrer.observe(&records(vec![json!({"a": {"b": {"c": 1}}})])[0]);

    let schema = inferrer.finish(&[]);
    let a = schema.get_property("a").unwrap();
    assert_eq!(a.properties.as_ref().unwrap()["b"].properties, None);
}

#[test]
fn test_empty_sample_is_permissive() {
    let schema = SchemaInferrer::new().finish(&id_key());
    assert!(schema.properties.is_empty());
    assert_eq!(
        schema.to_json(),
        json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "object",
            "properties": {},
            "required": ["id"],
            "additionalProperties": true
        })
    );
}
