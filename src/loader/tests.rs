//! Tests for YAML loader module

use super::*;
use crate::engine::ConfigList;
use crate::types::MissingCursorPolicy;
use std::io::Write;

const MINIMAL: &str = r"
name: test-connector
base_url: https://api.example.com/v1/
check:
  path: ping
streams:
  - name: users
    path: users
";

// ============================================================================
// Basic Loading Tests
// ============================================================================

#[test]
fn test_load_minimal_connector() {
    let def = load_connector_from_str(MINIMAL).unwrap();
    assert_eq!(def.name, "test-connector");
    assert_eq!(def.version, "0.1.0");
    assert_eq!(def.base_url, "https://api.example.com/v1/");
    assert_eq!(def.check.path, "ping");
    assert!(def.check.params.is_empty());
    assert_eq!(def.stream_names(), vec!["users"]);

    let users = def.stream("users").unwrap();
    assert_eq!(users.page_size, 10);
    assert!(!users.is_incremental());
    assert!(def.stream("missing").is_none());
}

#[test]
fn test_load_stream_options() {
    let yaml = r"
name: test
base_url: https://api.example.com
check:
  path: ping
  params:
    page[size]: '1'
streams:
  - name: values
    path: values
    primary_key: [id, field]
    relations: [field]
    page_size: 25
    filters:
      filter[kind]: text
    incremental:
      cursor_field: changed
      cursor_filter: filter[changed][from]
      missing_cursor: fail
    partition:
      values_from: custom_field_ids
      param: filter[field]
";

    let def = load_connector_from_str(yaml).unwrap();
    assert_eq!(def.check.params.get("page[size]"), Some(&"1".to_string()));

    let stream = &def.streams[0];
    assert_eq!(stream.primary_key, vec!["id".to_string(), "field".to_string()]);
    assert_eq!(stream.page_size, 25);
    assert_eq!(stream.filters.get("filter[kind]"), Some(&"text".to_string()));

    let incremental = stream.incremental.as_ref().unwrap();
    assert_eq!(incremental.cursor_field, "changed");
    assert_eq!(incremental.cursor_filter, "filter[changed][from]");
    assert_eq!(incremental.missing_cursor, MissingCursorPolicy::Fail);

    let partition = stream.partition.as_ref().unwrap();
    assert_eq!(partition.values_from, ConfigList::CustomFieldIds);
    assert_eq!(partition.param, "filter[field]");
}

// ============================================================================
// Validation Tests
// ============================================================================

#[test]
fn test_rejects_invalid_yaml() {
    let err = load_connector_from_str("name: [unclosed").unwrap_err();
    assert!(err.to_string().contains("Failed to parse connector YAML"));
}

#[test]
fn test_rejects_empty_streams() {
    let yaml = r"
name: test
base_url: https://api.example.com
check:
  path: ping
streams: []
";
    assert!(load_connector_from_str(yaml).is_err());
}

#[test]
fn test_rejects_duplicate_streams() {
    let yaml = r"
name: test
base_url: https://api.example.com
check:
  path: ping
streams:
  - name: users
    path: users
  - name: users
    path: people
";
    let err = load_connector_from_str(yaml).unwrap_err();
    assert!(err.to_string().contains("Duplicate stream names"));
}

#[test]
fn test_rejects_bad_base_url() {
    let yaml = MINIMAL.replace("https://api.example.com/v1/", "not a url");
    assert!(load_connector_from_str(&yaml).is_err());
}

#[test]
fn test_rejects_invalid_stream() {
    let yaml = MINIMAL.replace("path: users", "path: users\n    page_size: 0");
    let err = load_connector_from_str(&yaml).unwrap_err();
    assert!(err.to_string().contains("page_size"));
}

#[test]
fn test_rejects_unknown_partition_source() {
    let yaml = MINIMAL.replace(
        "path: users",
        "path: users\n    partition:\n      values_from: regions\n      param: region",
    );
    assert!(load_connector_from_str(&yaml).is_err());
}

// ============================================================================
// Name / Path Resolution Tests
// ============================================================================

#[test]
fn test_load_builtin_by_name() {
    let def = load_connector("teamtailor").unwrap();
    assert_eq!(def.name, "teamtailor");
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    file.write_all(MINIMAL.as_bytes()).unwrap();

    let def = load_connector(file.path()).unwrap();
    assert_eq!(def.name, "test-connector");
}

#[test]
fn test_unknown_connector_lists_builtins() {
    let err = load_connector("workday").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("not found"));
    assert!(message.contains("teamtailor"));
}
