//! In-memory transport that replays scripted responses.
//!
//! Search responses (`post_query` and `get_scroll`) are served from one FIFO
//! queue in the order they were pushed. Document sources are looked up by id;
//! an unknown id answers 404. Every call is recorded for later inspection.

use std::collections::{HashMap, HashSet, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use super::traits::{SearchTransport, TransportError, TransportResponse};

/// A call observed by [`ScriptedTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    PostQuery {
        scroll: bool,
        doc_type: String,
        index_name: String,
        body: String,
    },
    GetScroll {
        scroll_id: String,
    },
    GetDocSource {
        doc_type: String,
        index_name: String,
        id: String,
    },
    ClearScrollIds {
        scroll_ids: Vec<String>,
    },
    IndexExists(String),
    IndexCreate {
        index_name: String,
        mapping_json: String,
    },
    IndexDelete(String),
    IndexAlias(String),
}

enum Scripted {
    Response(TransportResponse),
    Failure(String),
}

#[derive(Default)]
struct ScriptState {
    search: VecDeque<Scripted>,
    documents: HashMap<String, TransportResponse>,
    indexes: HashSet<String>,
    fail_clear: bool,
    calls: Vec<TransportCall>,
}

#[derive(Default)]
pub struct ScriptedTransport {
    state: Mutex<ScriptState>,
}

impl ScriptedTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a search response body in the engine's wire shape.
    #[must_use]
    pub fn search_body(total: u64, scroll_id: Option<&str>, hits: &[Value]) -> Vec<u8> {
        let mut doc = json!({
            "took": 1,
            "timed_out": false,
            "hits": {
                "total": total,
                "max_score": 1.0,
                "hits": hits,
            }
        });
        if let Some(id) = scroll_id {
            doc["_scroll_id"] = Value::String(id.to_string());
        }
        serde_json::to_vec(&doc).unwrap_or_default()
    }

    /// Queue a 200 search page.
    pub fn push_page(&self, total: u64, scroll_id: Option<&str>, hits: &[Value]) {
        self.push_response(TransportResponse::ok(Self::search_body(total, scroll_id, hits)));
    }

    /// Queue an arbitrary search response.
    pub fn push_response(&self, response: TransportResponse) {
        self.state.lock().search.push_back(Scripted::Response(response));
    }

    /// Queue a transport-level failure for the next search call.
    pub fn push_failure(&self, message: impl Into<String>) {
        self.state.lock().search.push_back(Scripted::Failure(message.into()));
    }

    /// Store a document source served by `get_doc_source`.
    pub fn put_document(&self, id: impl Into<String>, source: &Value) {
        let body = serde_json::to_vec(source).unwrap_or_default();
        self.state.lock().documents.insert(id.into(), TransportResponse::ok(body));
    }

    /// Serve a fixed response for a document id (e.g. a 500).
    pub fn put_document_response(&self, id: impl Into<String>, response: TransportResponse) {
        self.state.lock().documents.insert(id.into(), response);
    }

    /// Make `clear_scroll_ids` fail.
    pub fn fail_clear(&self, fail: bool) {
        self.state.lock().fail_clear = fail;
    }

    /// Mark an index as already existing.
    pub fn add_index(&self, index_name: impl Into<String>) {
        self.state.lock().indexes.insert(index_name.into());
    }

    #[must_use]
    pub fn has_index(&self, index_name: &str) -> bool {
        self.state.lock().indexes.contains(index_name)
    }

    /// Number of search responses not yet consumed.
    #[must_use]
    pub fn pending_responses(&self) -> usize {
        self.state.lock().search.len()
    }

    #[must_use]
    pub fn calls(&self) -> Vec<TransportCall> {
        self.state.lock().calls.clone()
    }

    /// Scroll id sets passed to `clear_scroll_ids`, one entry per call.
    #[must_use]
    pub fn cleared_scroll_ids(&self) -> Vec<Vec<String>> {
        self.state
            .lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                TransportCall::ClearScrollIds { scroll_ids } => Some(scroll_ids.clone()),
                _ => None,
            })
            .collect()
    }

    /// Bodies of every `post_query` call.
    #[must_use]
    pub fn posted_queries(&self) -> Vec<String> {
        self.state
            .lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                TransportCall::PostQuery { body, .. } => Some(body.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: TransportCall) {
        self.state.lock().calls.push(call);
    }

    fn next_search(&self) -> Result<TransportResponse, TransportError> {
        match self.state.lock().search.pop_front() {
            Some(Scripted::Response(response)) => Ok(response),
            Some(Scripted::Failure(message)) => Err(TransportError::Connection(message)),
            None => Err(TransportError::Connection("no scripted response left".into())),
        }
    }
}

#[async_trait]
impl SearchTransport for ScriptedTransport {
    async fn post_query(
        &self,
        scroll: bool,
        doc_type: &str,
        index_name: &str,
        body: &[u8],
    ) -> Result<TransportResponse, TransportError> {
        self.record(TransportCall::PostQuery {
            scroll,
            doc_type: doc_type.to_string(),
            index_name: index_name.to_string(),
            body: String::from_utf8_lossy(body).into_owned(),
        });
        self.next_search()
    }

    async fn get_scroll(&self, scroll_id: &str) -> Result<TransportResponse, TransportError> {
        self.record(TransportCall::GetScroll {
            scroll_id: scroll_id.to_string(),
        });
        self.next_search()
    }

    async fn get_doc_source(
        &self,
        doc_type: &str,
        index_name: &str,
        id: &str,
    ) -> Result<TransportResponse, TransportError> {
        self.record(TransportCall::GetDocSource {
            doc_type: doc_type.to_string(),
            index_name: index_name.to_string(),
            id: id.to_string(),
        });
        Ok(self
            .state
            .lock()
            .documents
            .get(id)
            .cloned()
            .unwrap_or_else(TransportResponse::not_found))
    }

    async fn clear_scroll_ids(&self, scroll_ids: &[String]) -> Result<(), TransportError> {
        self.record(TransportCall::ClearScrollIds {
            scroll_ids: scroll_ids.to_vec(),
        });
        if self.state.lock().fail_clear {
            return Err(TransportError::Connection("clear scroll refused".into()));
        }
        Ok(())
    }

    async fn index_exists(&self, index_name: &str) -> Result<bool, TransportError> {
        self.record(TransportCall::IndexExists(index_name.to_string()));
        Ok(self.state.lock().indexes.contains(index_name))
    }

    async fn index_create(&self, index_name: &str, mapping_json: &str) -> Result<(), TransportError> {
        self.record(TransportCall::IndexCreate {
            index_name: index_name.to_string(),
            mapping_json: mapping_json.to_string(),
        });
        self.state.lock().indexes.insert(index_name.to_string());
        Ok(())
    }

    async fn index_delete(&self, index_name: &str) -> Result<(), TransportError> {
        self.record(TransportCall::IndexDelete(index_name.to_string()));
        self.state.lock().indexes.remove(index_name);
        Ok(())
    }

    async fn index_alias(&self, alias_json: &str) -> Result<(), TransportError> {
        self.record(TransportCall::IndexAlias(alias_json.to_string()));
        Ok(())
    }
}
