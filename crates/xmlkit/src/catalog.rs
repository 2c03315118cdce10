//! Error code catalog and lookup.
//!
//! Maps error codes (like `"X-2-1"`) to their metadata. Codes are grouped by
//! subsystem: `0` internal, `1` construction, `2` parse, `3` tree, `4`
//! xmlize, `5` config.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metadata for an error code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorCodeInfo {
    /// Subsystem name (e.g. "parse", "tree")
    pub subsystem: String,

    /// Short title for the error
    pub title: String,

    /// Default message
    pub message_template: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs_url: Option<String>,

    /// Version that introduced the code
    pub since_version: String,
}

/// Global error catalog, embedded at compile time and parsed on first use.
///
/// # Panics
///
/// Panics if the embedded JSON is invalid.
pub static ERROR_CATALOG: Lazy<HashMap<String, ErrorCodeInfo>> = Lazy::new(|| {
    let json_data = include_str!("../error_catalog.json");
    serde_json::from_str(json_data).expect("Invalid error catalog JSON - this is a bug in xmlkit")
});

/// Look up error code information.
pub fn get_error_info(code: &str) -> Option<&ErrorCodeInfo> {
    ERROR_CATALOG.get(code)
}

/// Documentation URL for an error code.
pub fn get_docs_url(code: &str) -> Option<&str> {
    ERROR_CATALOG
        .get(code)
        .and_then(|info| info.docs_url.as_deref())
}

/// Subsystem name for an error code.
///
/// ```
/// use xmlkit::catalog::get_subsystem;
///
/// assert_eq!(get_subsystem("X-2-1"), Some("parse"));
/// ```
pub fn get_subsystem(code: &str) -> Option<&str> {
    ERROR_CATALOG.get(code).map(|info| info.subsystem.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_loads() {
        assert!(!ERROR_CATALOG.is_empty());
    }

    #[test]
    fn test_every_code_has_docs() {
        for (code, info) in ERROR_CATALOG.iter() {
            let url = info.docs_url.as_deref().unwrap_or_default();
            assert!(url.ends_with(code.as_str()), "{code} has docs url {url}");
        }
    }

    #[test]
    fn test_get_subsystem() {
        assert_eq!(get_subsystem("X-1-1"), Some("construction"));
        assert_eq!(get_subsystem("X-3-2"), Some("tree"));
        assert_eq!(get_subsystem("X-999-999"), None);
    }

    #[test]
    fn test_nonexistent_code() {
        assert!(get_error_info("X-999-999").is_none());
        assert!(get_docs_url("X-999-999").is_none());
    }
}
