//! Configuration for the document store.
//!
//! # Example
//!
//! ```
//! use elastic_docstore::DocStoreConfig;
//!
//! // Minimal config (uses defaults)
//! let config = DocStoreConfig::default();
//! assert_eq!(config.index_version_suffix, "_v1");
//! assert!(config.max_scroll_rounds.is_none());
//!
//! // Full config
//! let config = DocStoreConfig {
//!     max_scroll_rounds: Some(10_000),
//!     drop_create_indexes: true,
//!     mapping_dir: Some("elastic-index".into()),
//!     ..Default::default()
//! };
//! ```

use serde::Deserialize;

/// Configuration for the document store.
///
/// All fields have sensible defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct DocStoreConfig {
    /// Upper bound on scroll continuation rounds for one streaming query.
    /// `None` scrolls until the engine reports no more hits.
    #[serde(default)]
    pub max_scroll_rounds: Option<u32>,

    /// Drop existing indexes before `create_indexes` recreates them
    #[serde(default)]
    pub drop_create_indexes: bool,

    /// Suffix appended to an alias to name its physical index (default: "_v1")
    #[serde(default = "default_index_version_suffix")]
    pub index_version_suffix: String,

    /// Directory that receives one `<index>.mapping.json` per created index
    #[serde(default)]
    pub mapping_dir: Option<String>,
}

fn default_index_version_suffix() -> String { "_v1".to_string() }

impl Default for DocStoreConfig {
    fn default() -> Self {
        Self {
            max_scroll_rounds: None,
            drop_create_indexes: false,
            index_version_suffix: default_index_version_suffix(),
            mapping_dir: None,
        }
    }
}

impl DocStoreConfig {
    /// Physical index name for an alias.
    #[must_use]
    pub fn versioned_index_name(&self, alias: &str) -> String {
        format!("{}{}", alias, self.index_version_suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DocStoreConfig::default();
        assert_eq!(config.max_scroll_rounds, None);
        assert!(!config.drop_create_indexes);
        assert_eq!(config.index_version_suffix, "_v1");
        assert_eq!(config.mapping_dir, None);
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: DocStoreConfig =
            serde_json::from_str(r#"{"max_scroll_rounds": 50}"#).unwrap();
        assert_eq!(config.max_scroll_rounds, Some(50));
        assert_eq!(config.index_version_suffix, "_v1");
    }

    #[test]
    fn test_versioned_index_name() {
        let config = DocStoreConfig {
            index_version_suffix: "_v2".into(),
            ..Default::default()
        };
        assert_eq!(config.versioned_index_name("order"), "order_v2");
    }
}
