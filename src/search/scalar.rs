//! Scalar value encoding for query documents.

use serde::ser::Error as _;
use serde_json::{Number, Value};

use super::query_builder::QueryValue;
use crate::error::Result;

/// Writes [`QueryValue`]s as JSON scalars.
///
/// Timestamps are written as epoch milliseconds, which the engine accepts
/// for `date` fields.
pub struct ScalarWriter;

impl ScalarWriter {
    pub fn write(value: &QueryValue) -> Result<Value> {
        Ok(match value {
            QueryValue::Null => Value::Null,
            QueryValue::Boolean(b) => Value::Bool(*b),
            QueryValue::Integer(i) | QueryValue::Timestamp(i) => Value::Number((*i).into()),
            QueryValue::Numeric(f) => {
                let number = Number::from_f64(*f).ok_or_else(|| {
                    serde_json::Error::custom(format!("non-finite number {} in query", f))
                })?;
                Value::Number(number)
            }
            QueryValue::Text(s) => Value::String(s.clone()),
        })
    }

    pub fn write_all(values: &[QueryValue]) -> Result<Vec<Value>> {
        values.iter().map(Self::write).collect()
    }

    /// Text form of a value, used for document ids.
    #[must_use]
    pub fn as_text(value: &QueryValue) -> String {
        match value {
            QueryValue::Null => String::new(),
            QueryValue::Boolean(b) => b.to_string(),
            QueryValue::Integer(i) | QueryValue::Timestamp(i) => i.to_string(),
            QueryValue::Numeric(f) => f.to_string(),
            QueryValue::Text(s) => s.clone(),
        }
    }
}
