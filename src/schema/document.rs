use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::mapping::DocMapping;
use super::record_type::RecordType;
use crate::error::{DocStoreError, Result};

/// A JSON-backed record: the engine id plus its source document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: Option<String>,
    pub source: Map<String, Value>,
}

impl Document {
    /// Value at a dotted path.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        segments.try_fold(self.source.get(first)?, |value, segment| value.get(segment))
    }

    /// Set a value at a dotted path, creating intermediate objects.
    /// A non-object value in the way is replaced.
    pub fn set(&mut self, path: &str, value: Value) {
        let mut segments: Vec<&str> = path.split('.').collect();
        let Some(last) = segments.pop() else {
            return;
        };

        let mut current = &mut self.source;
        for segment in segments {
            let entry = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            current = match entry {
                Value::Object(map) => map,
                _ => return,
            };
        }
        current.insert(last.to_string(), value);
    }
}

/// A record type whose records are plain [`Document`]s.
#[derive(Debug, Clone)]
pub struct DocumentType {
    type_key: String,
    mapping: DocMapping,
    id_property: String,
}

impl DocumentType {
    pub fn new(type_key: impl Into<String>, mapping: DocMapping) -> Self {
        Self {
            type_key: type_key.into(),
            mapping,
            id_property: "id".to_string(),
        }
    }

    /// Source property that carries the id when a document has no `_id`.
    pub fn with_id_property(mut self, id_property: impl Into<String>) -> Self {
        self.id_property = id_property.into();
        self
    }

    #[must_use]
    pub fn id_property(&self) -> &str {
        &self.id_property
    }
}

impl RecordType for DocumentType {
    type Record = Document;

    fn type_key(&self) -> &str {
        &self.type_key
    }

    fn doc_mapping(&self) -> &DocMapping {
        &self.mapping
    }

    fn create_record(&self) -> Document {
        Document::default()
    }

    fn set_id(&self, record: &mut Document, id: &str) {
        record.id = Some(id.to_string());
    }

    fn id_of(&self, record: &Document) -> Option<String> {
        record.id.clone()
    }

    fn set_path_value(&self, record: &mut Document, path: &str, value: Value) -> Result<()> {
        record.set(path, value);
        Ok(())
    }

    fn read_source(&self, source: &[u8]) -> Result<Document> {
        let value: Value = serde_json::from_slice(source)
            .map_err(|e| DocStoreError::MalformedResponse(format!("invalid _source: {}", e)))?;
        let Value::Object(source) = value else {
            return Err(DocStoreError::MalformedResponse(
                "_source is not a JSON object".into(),
            ));
        };

        let id = match source.get(&self.id_property) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        Ok(Document { id, source })
    }
}
