//! Tests for partition module

use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_partition_value() {
    let value = PartitionValue::new("12").with_param("filter[custom-field]", "12");
    assert_eq!(value.id, "12");
    assert_eq!(value.get("filter[custom-field]"), Some("12"));
    assert_eq!(value.get("other"), None);
}

#[test]
fn test_list_router_partitions() {
    let router = ListRouter::new(
        vec!["12".to_string(), "34".to_string()],
        "filter[custom-field]",
    );
    assert!(!router.is_empty());
    assert_eq!(router.partition_param(), "filter[custom-field]");

    let partitions = router.partitions().unwrap();
    assert_eq!(
        partitions,
        vec![
            PartitionValue::new("12").with_param("filter[custom-field]", "12"),
            PartitionValue::new("34").with_param("filter[custom-field]", "34"),
        ]
    );
}

#[test]
fn test_list_router_drops_blank_and_duplicate_values() {
    let router = ListRouter::new(
        vec![
            "7".to_string(),
            " ".to_string(),
            "7".to_string(),
            " 8 ".to_string(),
        ],
        "filter[custom-field]",
    );

    let ids: Vec<_> = router
        .partitions()
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ids, vec!["7".to_string(), "8".to_string()]);
}

#[test]
fn test_empty_list_router() {
    let router = ListRouter::new(Vec::new(), "filter[custom-field]");
    assert!(router.is_empty());
    assert!(router.partitions().unwrap().is_empty());
}
