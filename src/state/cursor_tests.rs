//! Tests for Cursor and Watermark

use super::*;
use crate::error::Error;
use crate::types::{JsonObject, MissingCursorPolicy};
use pretty_assertions::assert_eq;
use serde_json::json;
use test_case::test_case;

fn record(value: serde_json::Value) -> JsonObject {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}

fn cursor(start: &str) -> Cursor {
    Cursor::new(
        "updated-at",
        Watermark::parse(start).unwrap(),
        MissingCursorPolicy::Skip,
    )
    .for_stream("candidates")
}

fn state(value: &str) -> CursorState {
    CursorState::from([("updated-at".to_string(), value.to_string())])
}

// ============================================================================
// Watermark Tests
// ============================================================================

#[test_case("2024-01-02T03:04:05Z" ; "utc")]
#[test_case("2024-01-02T04:04:05+01:00" ; "offset")]
#[test_case("2024-01-02T03:04:05.000Z" ; "fraction")]
#[test_case("2024-01-02T03:04:05" ; "no zone")]
fn test_watermark_parse_datetimes(text: &str) {
    let mark = Watermark::parse(text).unwrap();
    assert_eq!(mark.at().to_rfc3339(), "2024-01-02T03:04:05+00:00");
    assert_eq!(mark.as_str(), text);
}

#[test]
fn test_watermark_parse_date() {
    let mark = Watermark::parse("2022-05-01").unwrap();
    assert_eq!(mark.at().to_rfc3339(), "2022-05-01T00:00:00+00:00");
    assert_eq!(mark.to_string(), "2022-05-01");
}

#[test_case("" ; "empty")]
#[test_case("   " ; "blank")]
#[test_case("yesterday" ; "words")]
#[test_case("2024-13-40" ; "out of range")]
fn test_watermark_rejects(text: &str) {
    assert!(Watermark::parse(text).is_none());
}

#[test]
fn test_watermark_compares_instants() {
    let earlier = Watermark::parse("2024-01-02T10:00:00+02:00").unwrap();
    let later = Watermark::parse("2024-01-02T09:00:00Z").unwrap();
    assert!(later.is_after(&earlier));
    assert!(!earlier.is_after(&later));
    assert!(!later.is_after(&later.clone()));
}

// ============================================================================
// Cursor State Tests
// ============================================================================

#[test]
fn test_initial_state_is_start_date() {
    let c = cursor("2022-05-01");
    assert_eq!(c.state(), state("2022-05-01"));
    assert_eq!(c.filter_value(), "2022-05-01");
    assert_eq!(c.field(), "updated-at");
}

#[test]
fn test_state_round_trip() {
    let mut c = cursor("2022-05-01");
    c.set_state(&state("2024-03-04T05:06:07.000+01:00"));
    let saved = c.state();
    assert_eq!(saved, state("2024-03-04T05:06:07.000+01:00"));

    let mut resumed = cursor("2022-05-01");
    resumed.set_state(&saved);
    assert_eq!(resumed.state(), saved);
}

#[test_case(CursorState::new() ; "absent")]
#[test_case(state("") ; "empty")]
#[test_case(state("not a date") ; "unparseable")]
fn test_set_state_falls_back_to_start(prior: CursorState) {
    let mut c = cursor("2022-05-01");
    c.observe(&record(json!({"id": "1", "updated-at": "2024-01-01T00:00:00Z"})))
        .unwrap();
    c.set_state(&prior);
    assert_eq!(c.state(), state("2022-05-01"));
}

// ============================================================================
// Observe Tests
// ============================================================================

#[test]
fn test_cursor_is_max_of_start_and_records() {
    let mut c = cursor("2022-05-01");
    for ts in [
        "2023-01-05T00:00:00Z",
        "2024-02-01T12:00:00Z",
        "2023-12-31T23:59:59Z",
        "2021-01-01T00:00:00Z",
    ] {
        c.observe(&record(json!({"id": "x", "updated-at": ts}))).unwrap();
    }
    assert_eq!(c.filter_value(), "2024-02-01T12:00:00Z");
}

#[test]
fn test_cursor_never_moves_backwards() {
    let mut c = cursor("2024-06-01");
    c.observe(&record(json!({"id": "1", "updated-at": "2024-01-01T00:00:00Z"})))
        .unwrap();
    assert_eq!(c.filter_value(), "2024-06-01");
}

#[test]
fn test_cursor_compares_across_offsets() {
    let mut c = cursor("2024-01-01");
    c.observe(&record(json!({"id": "1", "updated-at": "2024-01-02T09:00:00Z"})))
        .unwrap();
    c.observe(&record(json!({"id": "2", "updated-at": "2024-01-02T10:00:00+02:00"})))
        .unwrap();
    assert_eq!(c.filter_value(), "2024-01-02T09:00:00Z");
}

#[test_case(json!({"id": "1"}) ; "missing")]
#[test_case(json!({"id": "1", "updated-at": null}) ; "null")]
#[test_case(json!({"id": "1", "updated-at": 17}) ; "number")]
#[test_case(json!({"id": "1", "updated-at": "soon"}) ; "garbage")]
fn test_skip_policy_ignores_unusable_values(value: serde_json::Value) {
    let mut c = cursor("2022-05-01");
    c.observe(&record(value)).unwrap();
    assert_eq!(c.state(), state("2022-05-01"));
}

#[test]
fn test_fail_policy_errors_on_missing_value() {
    let mut c = Cursor::new(
        "updated-at",
        Watermark::parse("2022-05-01").unwrap(),
        MissingCursorPolicy::Fail,
    )
    .for_stream("job-applications");
    assert_eq!(c.policy(), MissingCursorPolicy::Fail);

    let err = c.observe(&record(json!({"id": "1"}))).unwrap_err();
    assert!(matches!(
        err,
        Error::MissingCursorField { ref stream, ref field }
            if stream == "job-applications" && field == "updated-at"
    ));
    assert_eq!(c.filter_value(), "2022-05-01");
}
