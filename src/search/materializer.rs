//! Hit materialization strategies.
//!
//! One strategy is chosen per query:
//!
//! | Query shape                 | Strategy                    |
//! |-----------------------------|-----------------------------|
//! | no selection                | [`SourceMaterializer`]      |
//! | selected paths              | [`FieldsMaterializer`]      |
//! | raw streaming               | [`RawSourceMaterializer`]   |

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{trace, warn};

use super::query::SearchQuery;
use super::result_parser::Hit;
use crate::error::{DocStoreError, Result};
use crate::schema::RecordType;

/// Turns one engine hit into an output value.
pub trait HitMaterializer {
    type Output;

    fn materialize(&self, hit: Hit) -> Result<Self::Output>;
}

/// Assign single-valued sparse fields on non-many paths.
///
/// The engine returns every field as an array; arrays with more than one
/// value (and any many path) are skipped.
fn apply_fields<R: RecordType>(
    record_type: &R,
    record: &mut R::Record,
    fields: BTreeMap<String, Value>,
) -> Result<()> {
    for (path, value) in fields {
        if record_type.contains_many(&path) {
            trace!(path = %path, "Skipping many path in fields");
            continue;
        }
        let value = match value {
            Value::Array(mut values) if values.len() == 1 => values.remove(0),
            Value::Array(values) => {
                warn!(path = %path, count = values.len(), "Ignoring multi-valued field on single path");
                continue;
            }
            other => other,
        };
        record_type.set_path_value(record, &path, value)?;
    }
    Ok(())
}

/// Full records from `_source`. A hit without a source yields an id-only
/// record.
pub struct SourceMaterializer<'a, R: RecordType> {
    record_type: &'a R,
}

impl<'a, R: RecordType> SourceMaterializer<'a, R> {
    pub fn new(record_type: &'a R) -> Self {
        Self { record_type }
    }
}

impl<R: RecordType> HitMaterializer for SourceMaterializer<'_, R> {
    type Output = R::Record;

    fn materialize(&self, hit: Hit) -> Result<R::Record> {
        let mut record = match &hit.source {
            Some(source) => self.record_type.read_source(source.get().as_bytes())?,
            None => self.record_type.create_record(),
        };
        self.record_type.set_id(&mut record, &hit.id);
        Ok(record)
    }
}

/// Sparse records: id plus selected field values. A partial `_source`
/// (from many-path includes) seeds the record when present.
pub struct FieldsMaterializer<'a, R: RecordType> {
    record_type: &'a R,
}

impl<'a, R: RecordType> FieldsMaterializer<'a, R> {
    pub fn new(record_type: &'a R) -> Self {
        Self { record_type }
    }
}

impl<R: RecordType> HitMaterializer for FieldsMaterializer<'_, R> {
    type Output = R::Record;

    fn materialize(&self, hit: Hit) -> Result<R::Record> {
        let mut record = match &hit.source {
            Some(source) => self.record_type.read_source(source.get().as_bytes())?,
            None => self.record_type.create_record(),
        };
        self.record_type.set_id(&mut record, &hit.id);
        apply_fields(self.record_type, &mut record, hit.fields)?;
        Ok(record)
    }
}

/// Record strategy picked once per query from its selection.
pub enum RecordMaterializer<'a, R: RecordType> {
    Source(SourceMaterializer<'a, R>),
    Fields(FieldsMaterializer<'a, R>),
}

impl<'a, R: RecordType> RecordMaterializer<'a, R> {
    pub fn for_query(query: &SearchQuery<'a, R>) -> Self {
        if query.selects_fields() {
            Self::Fields(FieldsMaterializer::new(query.record_type()))
        } else {
            Self::Source(SourceMaterializer::new(query.record_type()))
        }
    }
}

impl<R: RecordType> HitMaterializer for RecordMaterializer<'_, R> {
    type Output = R::Record;

    fn materialize(&self, hit: Hit) -> Result<R::Record> {
        match self {
            Self::Source(source) => source.materialize(hit),
            Self::Fields(fields) => fields.materialize(hit),
        }
    }
}

/// A hit's id and its `_source` JSON text, untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSource {
    pub id: String,
    pub source: String,
}

#[derive(Debug, Default)]
pub struct RawSourceMaterializer;

impl HitMaterializer for RawSourceMaterializer {
    type Output = RawSource;

    fn materialize(&self, hit: Hit) -> Result<RawSource> {
        let source = hit.source.ok_or_else(|| {
            DocStoreError::MalformedResponse(format!("hit {} has no _source", hit.id))
        })?;
        Ok(RawSource {
            id: hit.id,
            source: source.get().to_string(),
        })
    }
}
