//! Built-in connector definitions embedded in the binary
//!
//! The stream catalog ships inside the executable so `--connector teamtailor`
//! works without a definition file on disk.

use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Name of the default connector
pub const TEAMTAILOR: &str = "teamtailor";

/// Built-in connector YAML definitions
pub static BUILTIN_CONNECTORS: LazyLock<BTreeMap<&'static str, &'static str>> =
    LazyLock::new(|| {
        let mut m = BTreeMap::new();
        m.insert(TEAMTAILOR, include_str!("../connectors/teamtailor.yaml"));
        m
    });

/// Get a built-in connector by name
pub fn get_builtin(name: &str) -> Option<&'static str> {
    BUILTIN_CONNECTORS.get(name).copied()
}

/// Check if a connector name is a built-in connector
pub fn is_builtin(name: &str) -> bool {
    BUILTIN_CONNECTORS.contains_key(name)
}

/// List all built-in connector names
pub fn list_builtin() -> Vec<&'static str> {
    BUILTIN_CONNECTORS.keys().copied().collect()
}
