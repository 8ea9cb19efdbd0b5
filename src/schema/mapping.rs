//! Document mapping for a record type.
//!
//! # Engine mapping generated
//!
//! ```text
//! {"mappings": {"order": {"properties": {
//!     "status":   {"type": "string"},
//!     "customer": {"type": "object", "properties": {
//!         "name": {"type": "string", "fields": {"raw": {"type": "string", "index": "not_analyzed"}}}
//!     }},
//!     "lines":    {"type": "nested", "properties": {"qty": {"type": "long"}}}
//! }}}}
//! ```

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

use super::record_type::ExpressionPath;

/// Property type as declared by the record layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocPropertyType {
    String,
    Uuid,
    Enum,
    Boolean,
    Integer,
    Long,
    Double,
    Binary,
    Date,
    DateTime,
    /// One-to-many relation, mapped as nested documents.
    List,
    /// One-to-one relation, mapped as an embedded object.
    Object,
    Root,
}

impl DocPropertyType {
    /// Engine type name used in index mappings.
    #[must_use]
    pub fn es_type(&self) -> &'static str {
        match self {
            Self::String | Self::Uuid | Self::Enum => "string",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Long => "long",
            Self::Double => "double",
            Self::Binary => "binary",
            Self::Date | Self::DateTime => "date",
            Self::List => "nested",
            Self::Object => "object",
            Self::Root => "root",
        }
    }

    /// Whether LIKE style operators apply.
    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self, Self::String | Self::Uuid | Self::Enum)
    }

    #[must_use]
    pub fn is_container(&self) -> bool {
        matches!(self, Self::List | Self::Object | Self::Root)
    }
}

/// A single mapped property, addressed by its full dotted path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyMapping {
    pub name: String,
    pub property_type: DocPropertyType,
    /// Non-analyzed field used for exact match and sort.
    pub raw: Option<String>,
}

/// Index name, document type and properties for one record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocMapping {
    /// Index name (an alias in practice; the physical index carries a suffix)
    pub index_name: String,
    pub doc_type: String,
    properties: Vec<PropertyMapping>,
}

impl DocMapping {
    pub fn new(index_name: impl Into<String>, doc_type: impl Into<String>) -> Self {
        Self {
            index_name: index_name.into(),
            doc_type: doc_type.into(),
            properties: Vec::new(),
        }
    }

    /// Add a property of the given type. Re-adding a name replaces it.
    pub fn property(mut self, name: impl Into<String>, property_type: DocPropertyType) -> Self {
        self.push(PropertyMapping {
            name: name.into(),
            property_type,
            raw: None,
        });
        self
    }

    /// Add an analyzed text property
    pub fn text(self, name: impl Into<String>) -> Self {
        self.property(name, DocPropertyType::String)
    }

    /// Add a text property with a raw (not analyzed) field for exact match and sort
    pub fn raw(mut self, name: impl Into<String>, raw_name: impl Into<String>) -> Self {
        self.push(PropertyMapping {
            name: name.into(),
            property_type: DocPropertyType::String,
            raw: Some(raw_name.into()),
        });
        self
    }

    pub fn long(self, name: impl Into<String>) -> Self {
        self.property(name, DocPropertyType::Long)
    }

    pub fn integer(self, name: impl Into<String>) -> Self {
        self.property(name, DocPropertyType::Integer)
    }

    pub fn double(self, name: impl Into<String>) -> Self {
        self.property(name, DocPropertyType::Double)
    }

    pub fn boolean(self, name: impl Into<String>) -> Self {
        self.property(name, DocPropertyType::Boolean)
    }

    pub fn date_time(self, name: impl Into<String>) -> Self {
        self.property(name, DocPropertyType::DateTime)
    }

    /// Add a one-to-many relation root
    pub fn many(self, name: impl Into<String>) -> Self {
        self.property(name, DocPropertyType::List)
    }

    /// Add a one-to-one relation root
    pub fn object(self, name: impl Into<String>) -> Self {
        self.property(name, DocPropertyType::Object)
    }

    fn push(&mut self, mapping: PropertyMapping) {
        if let Some(pos) = self.properties.iter().position(|p| p.name == mapping.name) {
            self.properties[pos] = mapping;
        } else {
            self.properties.push(mapping);
        }
    }

    #[must_use]
    pub fn properties(&self) -> &[PropertyMapping] {
        &self.properties
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PropertyMapping> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// The raw field for a property, or the property name when none is mapped.
    #[must_use]
    pub fn raw_property<'a>(&'a self, name: &'a str) -> &'a str {
        self.get(name)
            .and_then(|p| p.raw.as_deref())
            .unwrap_or(name)
    }

    /// Shortest prefix of `path` (including the path itself) mapped as a list.
    #[must_use]
    pub fn many_root(&self, path: &str) -> Option<String> {
        path.match_indices('.')
            .map(|(idx, _)| idx)
            .chain(std::iter::once(path.len()))
            .map(|end| &path[..end])
            .find(|prefix| {
                self.get(prefix)
                    .map_or(false, |p| p.property_type == DocPropertyType::List)
            })
            .map(str::to_string)
    }

    /// Resolve a dotted path. Unmapped paths yield `None`.
    #[must_use]
    pub fn expression_path(&self, path: &str) -> Option<ExpressionPath> {
        let property = self.get(path)?;
        let many_root_path = self.many_root(path);
        Some(ExpressionPath {
            raw_field_name: property.raw.clone().unwrap_or_else(|| path.to_string()),
            contains_many: many_root_path.is_some(),
            many_root_path,
            property_type: property.property_type,
        })
    }

    /// Generate the engine index mapping document.
    #[must_use]
    pub fn to_mapping_json(&self) -> Value {
        let mut root = MappingNode::default();
        for property in &self.properties {
            let mut node = &mut root;
            for segment in property.name.split('.') {
                node = node.children.entry(segment.to_string()).or_default();
            }
            node.property_type = Some(property.property_type);
            node.raw_sub_field = property.raw.as_ref().map(|raw| {
                raw.strip_prefix(&format!("{}.", property.name))
                    .unwrap_or("raw")
                    .to_string()
            });
        }

        let mut doc_type = Map::new();
        doc_type.insert(self.doc_type.clone(), json!({ "properties": root.children_json() }));
        json!({ "mappings": doc_type })
    }
}

#[derive(Default)]
struct MappingNode {
    property_type: Option<DocPropertyType>,
    raw_sub_field: Option<String>,
    children: BTreeMap<String, MappingNode>,
}

impl MappingNode {
    fn children_json(&self) -> Map<String, Value> {
        self.children
            .iter()
            .map(|(name, child)| (name.clone(), child.to_json()))
            .collect()
    }

    fn to_json(&self) -> Value {
        // Intermediate segments that were never declared are plain objects
        let property_type = self.property_type.unwrap_or(DocPropertyType::Object);
        if property_type.is_container() || !self.children.is_empty() {
            let container = if property_type == DocPropertyType::List { "nested" } else { "object" };
            return json!({ "type": container, "properties": self.children_json() });
        }

        let mut field = Map::new();
        field.insert("type".into(), Value::String(property_type.es_type().into()));
        if let Some(sub) = &self.raw_sub_field {
            let mut fields = Map::new();
            fields.insert(sub.clone(), json!({ "type": "string", "index": "not_analyzed" }));
            field.insert("fields".into(), Value::Object(fields));
        }
        Value::Object(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order_mapping() -> DocMapping {
        DocMapping::new("order", "order")
            .text("status")
            .raw("customer.name", "customer.name.raw")
            .many("lines")
            .long("lines.qty")
            .text("lines.product.name")
            .date_time("whenCreated")
    }

    #[test]
    fn test_es_type_mapping() {
        assert_eq!(DocPropertyType::Uuid.es_type(), "string");
        assert_eq!(DocPropertyType::Enum.es_type(), "string");
        assert_eq!(DocPropertyType::Binary.es_type(), "binary");
        assert_eq!(DocPropertyType::Date.es_type(), "date");
        assert_eq!(DocPropertyType::DateTime.es_type(), "date");
        assert_eq!(DocPropertyType::List.es_type(), "nested");
        assert_eq!(DocPropertyType::Object.es_type(), "object");
        assert_eq!(DocPropertyType::Root.es_type(), "root");
    }

    #[test]
    fn test_raw_property_falls_back_to_name() {
        let mapping = order_mapping();
        assert_eq!(mapping.raw_property("customer.name"), "customer.name.raw");
        assert_eq!(mapping.raw_property("status"), "status");
        assert_eq!(mapping.raw_property("unmapped"), "unmapped");
    }

    #[test]
    fn test_expression_path_many() {
        let mapping = order_mapping();
        let path = mapping.expression_path("lines.product.name").unwrap();
        assert!(path.contains_many);
        assert_eq!(path.many_root_path.as_deref(), Some("lines"));
        assert_eq!(path.property_type, DocPropertyType::String);

        let root = mapping.expression_path("lines").unwrap();
        assert!(root.contains_many);
    }

    #[test]
    fn test_expression_path_one_and_root() {
        let mapping = order_mapping();
        let path = mapping.expression_path("customer.name").unwrap();
        assert!(!path.contains_many);
        assert_eq!(path.many_root_path, None);
        assert_eq!(path.raw_field_name, "customer.name.raw");

        assert!(mapping.expression_path("nope").is_none());
    }

    #[test]
    fn test_redeclare_replaces() {
        let mapping = DocMapping::new("i", "t").text("name").raw("name", "name.raw");
        assert_eq!(mapping.properties().len(), 1);
        assert_eq!(mapping.raw_property("name"), "name.raw");
    }

    #[test]
    fn test_mapping_json_shape() {
        let json = order_mapping().to_mapping_json();
        let props = &json["mappings"]["order"]["properties"];

        assert_eq!(props["status"]["type"], "string");
        assert_eq!(props["customer"]["type"], "object");
        assert_eq!(
            props["customer"]["properties"]["name"]["fields"]["raw"]["index"],
            "not_analyzed"
        );
        assert_eq!(props["lines"]["type"], "nested");
        assert_eq!(props["lines"]["properties"]["qty"]["type"], "long");
        assert_eq!(props["lines"]["properties"]["product"]["type"], "object");
        assert_eq!(props["whenCreated"]["type"], "date");
    }
}
