use serde_json::Value;

use super::mapping::{DocMapping, DocPropertyType};
use crate::error::Result;

/// Resolved metadata for a dotted property path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionPath {
    /// Engine-side field used for exact match and sort.
    pub raw_field_name: String,
    /// Whether the path crosses a many relation.
    pub contains_many: bool,
    /// The many relation root when `contains_many` is set.
    pub many_root_path: Option<String>,
    pub property_type: DocPropertyType,
}

/// A record type known to the host persistence layer.
///
/// Implementors provide record construction; path resolution defaults to the
/// type's [`DocMapping`].
pub trait RecordType: Send + Sync {
    type Record: Send;

    /// Stable key identifying the type.
    fn type_key(&self) -> &str;

    fn doc_mapping(&self) -> &DocMapping;

    fn expression_path(&self, path: &str) -> Option<ExpressionPath> {
        self.doc_mapping().expression_path(path)
    }

    /// Unknown paths are treated as many paths, which keeps them out of the
    /// sparse `fields` list.
    fn contains_many(&self, path: &str) -> bool {
        self.expression_path(path).map_or(true, |p| p.contains_many)
    }

    fn create_record(&self) -> Self::Record;

    fn set_id(&self, record: &mut Self::Record, id: &str);

    fn id_of(&self, record: &Self::Record) -> Option<String>;

    /// Assign a single value at a non-many path.
    fn set_path_value(&self, record: &mut Self::Record, path: &str, value: Value) -> Result<()>;

    /// Build a record from an engine `_source` document.
    fn read_source(&self, source: &[u8]) -> Result<Self::Record>;
}
