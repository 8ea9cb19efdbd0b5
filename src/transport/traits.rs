use async_trait::async_trait;
use thiserror::Error;

use crate::error::DocStoreError;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    Connection(String),
    #[error("Request timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Raw response from the engine: status code plus body bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self { status, body: body.into() }
    }

    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::new(200, body)
    }

    pub fn not_found() -> Self {
        Self::new(404, Vec::new())
    }

    /// Body as lossy UTF-8, for diagnostics.
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Apply the status code contract: 200 yields the body, 404 becomes
    /// [`DocStoreError::DocumentNotFound`], anything else is a wire error.
    pub fn into_body(self, not_found_context: impl FnOnce() -> String) -> Result<Vec<u8>, DocStoreError> {
        match self.status {
            200 => Ok(self.body),
            404 => Err(DocStoreError::DocumentNotFound(not_found_context())),
            status => Err(DocStoreError::WireProtocol {
                status,
                body: self.body_text(),
            }),
        }
    }
}

/// Round-trips to the search engine.
///
/// Timeouts and retries belong to the implementation; the document store
/// propagates whatever failure comes back and never retries.
#[async_trait]
pub trait SearchTransport: Send + Sync {
    /// POST a compiled query to `index_name/doc_type/_search`, opening a
    /// scroll cursor when `scroll` is set.
    async fn post_query(
        &self,
        scroll: bool,
        doc_type: &str,
        index_name: &str,
        body: &[u8],
    ) -> Result<TransportResponse, TransportError>;

    /// Fetch the next page for a scroll cursor.
    async fn get_scroll(&self, scroll_id: &str) -> Result<TransportResponse, TransportError>;

    /// Fetch a single document's `_source` by id.
    async fn get_doc_source(
        &self,
        doc_type: &str,
        index_name: &str,
        id: &str,
    ) -> Result<TransportResponse, TransportError>;

    /// Release server-side scroll cursors.
    async fn clear_scroll_ids(&self, scroll_ids: &[String]) -> Result<(), TransportError>;

    async fn index_exists(&self, index_name: &str) -> Result<bool, TransportError>;

    async fn index_create(&self, index_name: &str, mapping_json: &str) -> Result<(), TransportError>;

    async fn index_delete(&self, index_name: &str) -> Result<(), TransportError>;

    /// Apply an alias change document (`{"actions":[...]}`).
    async fn index_alias(&self, alias_json: &str) -> Result<(), TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_body_ok() {
        let body = TransportResponse::ok("{}").into_body(|| "q".into()).unwrap();
        assert_eq!(body, b"{}");
    }

    #[test]
    fn test_into_body_not_found() {
        let err = TransportResponse::not_found()
            .into_body(|| "404 for docId:7".into())
            .unwrap_err();
        assert!(matches!(err, DocStoreError::DocumentNotFound(ref msg) if msg == "404 for docId:7"));
    }

    #[test]
    fn test_into_body_other_status_is_wire_error() {
        let err = TransportResponse::new(500, "shard failure")
            .into_body(|| unreachable!())
            .unwrap_err();
        match err {
            DocStoreError::WireProtocol { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "shard failure");
            }
            other => panic!("Expected WireProtocol, got {:?}", other),
        }
    }
}
