//! Search response envelope parsing.
//!
//! ```text
//! {"_scroll_id": "c2Nh...", "took": 3, "hits": {
//!     "total": 120,                       -- or {"value": 120, "relation": "eq"}
//!     "hits": [{"_id": "1", "_score": 1.0, "_source": {...}, "fields": {...}}]
//! }}
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::value::RawValue;
use serde_json::Value;

use super::materializer::HitMaterializer;
use crate::error::{DocStoreError, Result};

/// One hit as returned by the engine.
#[derive(Debug, Deserialize)]
pub struct Hit {
    #[serde(rename = "_id")]
    pub id: String,
    /// Absent or null when results are sorted
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    #[serde(rename = "_source", default)]
    pub source: Option<Box<RawValue>>,
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TotalHits {
    Count(u64),
    Tracked { value: u64 },
}

impl TotalHits {
    fn value(&self) -> u64 {
        match self {
            Self::Count(n) | Self::Tracked { value: n } => *n,
        }
    }
}

#[derive(Debug, Deserialize)]
struct HitsEnvelope {
    total: TotalHits,
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(rename = "_scroll_id", default)]
    scroll_id: Option<String>,
    hits: HitsEnvelope,
}

/// A parsed but not yet materialized result page.
#[derive(Debug)]
pub struct ResultPage {
    pub total: u64,
    pub scroll_id: Option<String>,
    pub hits: Vec<Hit>,
}

impl ResultPage {
    /// Parse a search (or scroll) response body.
    pub fn parse(body: &[u8]) -> Result<Self> {
        let envelope: SearchEnvelope = serde_json::from_slice(body)
            .map_err(|e| DocStoreError::MalformedResponse(format!("search response: {}", e)))?;
        Ok(Self {
            total: envelope.hits.total.value(),
            scroll_id: envelope.scroll_id,
            hits: envelope.hits.hits,
        })
    }

    /// Materialize every hit with one strategy.
    pub fn materialize<M: HitMaterializer>(self, materializer: &M) -> Result<SearchPage<M::Output>> {
        let records = self
            .hits
            .into_iter()
            .map(|hit| materializer.materialize(hit))
            .collect::<Result<Vec<_>>>()?;
        crate::metrics::record_page_hits(records.len());
        Ok(SearchPage {
            total: self.total,
            scroll_id: self.scroll_id,
            records,
        })
    }
}

/// A materialized result page.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage<T> {
    /// Total hits for the whole query, not just this page
    pub total: u64,
    pub scroll_id: Option<String>,
    pub records: Vec<T>,
}

impl<T> SearchPage<T> {
    /// True when this page alone accounts for every hit.
    #[must_use]
    pub fn all_hits_read(&self) -> bool {
        self.total == 0 || self.records.len() as u64 == self.total
    }

    #[must_use]
    pub fn zero_hits(&self) -> bool {
        self.records.is_empty()
    }
}

/// Parse and materialize a response body in one step.
pub fn parse_page<M: HitMaterializer>(body: &[u8], materializer: &M) -> Result<SearchPage<M::Output>> {
    ResultPage::parse(body)?.materialize(materializer)
}
