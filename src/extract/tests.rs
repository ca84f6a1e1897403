//! Tests for extract module

use super::*;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn job_applications() -> JsonApiExtractor {
    JsonApiExtractor::new(["job", "stage", "reject-reason", "candidate"])
}

fn as_records(values: Vec<Value>) -> Vec<crate::types::Record> {
    values
        .into_iter()
        .map(|v| match v {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        })
        .collect()
}

#[test]
fn test_relation_key() {
    assert_eq!(relation_key("candidate"), "candidate_id");
    assert_eq!(relation_key("reject-reason"), "reject_reason_id");
    assert_eq!(relation_key("custom-field"), "custom_field_id");
}

#[test]
fn test_flattens_relationships_and_attributes() {
    let body = json!({
        "data": [{
            "id": "1234",
            "type": "job-applications",
            "attributes": {"sourced": true},
            "relationships": {
                "candidate": {"data": {"id": "1234", "type": "candidates"}},
                "job": {"data": {"id": "5678", "type": "jobs"}}
            }
        }]
    });

    let records = job_applications().extract(&body);
    assert_eq!(
        records,
        as_records(vec![json!({
            "id": "1234",
            "sourced": true,
            "candidate_id": "1234",
            "job_id": "5678"
        })])
    );
}

#[test]
fn test_empty_relationships_are_omitted() {
    let body = json!({
        "data": [{
            "id": "1234",
            "attributes": {"sourced": true},
            "relationships": {
                "candidate": {},
                "job": {"data": null},
                "stage": {"data": {"type": "stages", "id": ""}},
                "reject-reason": {"data": {"type": "reject-reasons", "id": null}}
            }
        }]
    });

    let records = job_applications().extract(&body);
    assert_eq!(records, as_records(vec![json!({"id": "1234", "sourced": true})]));
}

#[test]
fn test_hyphenated_relation() {
    let body = json!({
        "data": [{
            "id": "9",
            "attributes": {},
            "relationships": {"reject-reason": {"data": {"type": "reject-reasons", "id": "4"}}}
        }]
    });

    let record = &job_applications().extract(&body)[0];
    assert_eq!(record.get("reject_reason_id"), Some(&json!("4")));
}

#[test]
fn test_unconfigured_relations_ignored() {
    let body = json!({
        "data": [{
            "id": "1",
            "attributes": {"name": "Stockholm"},
            "relationships": {"candidate": {"data": {"type": "candidates", "id": "3"}}}
        }]
    });

    let records = JsonApiExtractor::default().extract(&body);
    assert_eq!(
        records,
        as_records(vec![json!({"id": "1", "name": "Stockholm"})])
    );
}

#[test]
fn test_to_many_relation_is_not_flattened() {
    let body = json!({
        "data": [{
            "id": "1",
            "attributes": {"first-name": "Ada"},
            "relationships": {
                "job-applications": {"data": [{"type": "job-applications", "id": "5"}]}
            }
        }]
    });

    let records = JsonApiExtractor::new(["job-applications"]).extract(&body);
    assert_eq!(records, as_records(vec![json!({"id": "1", "first-name": "Ada"})]));
}

#[test]
fn test_attributes_override_relation_keys() {
    let body = json!({
        "data": [{
            "id": "1",
            "attributes": {"job_id": "from-attributes"},
            "relationships": {"job": {"data": {"type": "jobs", "id": "from-relationship"}}}
        }]
    });

    let record = &JsonApiExtractor::new(["job"]).extract(&body)[0];
    assert_eq!(record.get("job_id"), Some(&json!("from-attributes")));
}

#[test]
fn test_preserves_document_order_and_skips_non_objects() {
    let body = json!({
        "data": [
            {"id": "a", "attributes": {}},
            "junk",
            {"id": "b", "attributes": {}},
            {"id": "c"}
        ]
    });

    let ids: Vec<_> = JsonApiExtractor::default()
        .records(&body)
        .map(|r| r["id"].clone())
        .collect();
    assert_eq!(ids, vec![json!("a"), json!("b"), json!("c")]);
}

#[test]
fn test_missing_or_invalid_data_yields_nothing() {
    let extractor = job_applications();
    assert!(extractor.extract(&json!({})).is_empty());
    assert!(extractor.extract(&json!({"data": null})).is_empty());
    assert!(extractor.extract(&json!({"data": "nope"})).is_empty());
    assert!(extractor.extract(&json!({"data": []})).is_empty());
}

#[test]
fn test_single_resource_document() {
    let body = json!({"data": {"id": "1", "attributes": {"name": "HQ"}}});
    let records = JsonApiExtractor::default().extract(&body);
    assert_eq!(records, as_records(vec![json!({"id": "1", "name": "HQ"})]));
}

#[test]
fn test_records_is_lazy_and_restartable() {
    let body = json!({"data": [{"id": "1"}, {"id": "2"}, {"id": "3"}]});
    let extractor = JsonApiExtractor::default();

    let first: Vec<_> = extractor.records(&body).take(1).collect();
    assert_eq!(first.len(), 1);
    assert_eq!(extractor.records(&body).count(), 3);
}
