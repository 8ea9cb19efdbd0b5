// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Scroll sessions: streaming every hit of a query page by page.
//!
//! # Lifecycle
//!
//! ```text
//! Initial ──post_query(scroll)──► PageRead ──get_scroll──► PageRead ...
//!                                    │
//!                 all hits read / zero hits / consumer break / error
//!                                    ▼
//!                                  Done ──► clear_scroll_ids(all seen)
//! ```
//!
//! Every cursor id the engine hands back is recorded in a [`CursorSet`].
//! The set is released exactly once when the session ends, whatever the
//! outcome. A release failure is logged and never replaces the session's
//! own result. If the session future is dropped mid-flight, the set's
//! `Drop` hands the release to the current Tokio runtime.

use std::ops::ControlFlow;
use std::sync::Arc;

use tracing::{debug, error, warn};

use super::materializer::HitMaterializer;
use super::result_parser::parse_page;
use crate::error::{DocStoreError, Result};
use crate::metrics;
use crate::transport::SearchTransport;

/// Ordered, de-duplicated set of scroll cursor ids awaiting release.
pub struct CursorSet {
    transport: Arc<dyn SearchTransport>,
    ids: Vec<String>,
    released: bool,
}

impl CursorSet {
    pub fn new(transport: Arc<dyn SearchTransport>) -> Self {
        Self {
            transport,
            ids: Vec::new(),
            released: false,
        }
    }

    /// Record a cursor id. Repeats are ignored.
    pub fn add(&mut self, id: &str) {
        if !self.ids.iter().any(|existing| existing == id) {
            self.ids.push(id.to_string());
        }
    }

    #[must_use]
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Release all recorded cursors with a single call. Idempotent; an empty
    /// set makes no call at all. Failures are logged, not returned.
    ///
    /// The set only counts as released once the call has returned, so a
    /// session dropped mid-release still hands its ids to `Drop`.
    pub async fn release(&mut self) {
        if self.released {
            return;
        }
        if self.ids.is_empty() {
            self.released = true;
            return;
        }

        let result = self.transport.clear_scroll_ids(&self.ids).await;
        self.released = true;
        match result {
            Ok(()) => {
                debug!(count = self.ids.len(), "Released scroll cursors");
                metrics::record_cursor_release(self.ids.len(), true);
            }
            Err(e) => {
                error!(error = %e, scroll_ids = ?self.ids, "Error trying to clear scroll ids");
                metrics::record_cursor_release(self.ids.len(), false);
            }
        }
    }
}

impl Drop for CursorSet {
    fn drop(&mut self) {
        if self.released || self.ids.is_empty() {
            return;
        }
        let ids = std::mem::take(&mut self.ids);
        let transport = Arc::clone(&self.transport);

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                warn!(count = ids.len(), "Scroll session abandoned, releasing cursors in background");
                handle.spawn(async move {
                    let success = match transport.clear_scroll_ids(&ids).await {
                        Ok(()) => true,
                        Err(e) => {
                            error!(error = %e, scroll_ids = ?ids, "Error trying to clear scroll ids");
                            false
                        }
                    };
                    metrics::record_cursor_release(ids.len(), success);
                });
            }
            Err(_) => {
                error!(scroll_ids = ?ids, "No runtime to release scroll cursors, they will expire server side");
            }
        }
    }
}

/// One streaming query over a scroll cursor.
pub struct ScrollSession<'m, M: HitMaterializer> {
    transport: Arc<dyn SearchTransport>,
    materializer: &'m M,
    cursors: CursorSet,
    max_rounds: Option<u32>,
    rounds: u32,
    delivered: u64,
}

impl<'m, M: HitMaterializer> ScrollSession<'m, M> {
    pub fn new(transport: Arc<dyn SearchTransport>, materializer: &'m M, max_rounds: Option<u32>) -> Self {
        Self {
            cursors: CursorSet::new(Arc::clone(&transport)),
            transport,
            materializer,
            max_rounds,
            rounds: 0,
            delivered: 0,
        }
    }

    /// Run the query, handing each record to `consumer` as its page arrives.
    /// The consumer may stop the session early with `ControlFlow::Break`.
    ///
    /// Returns the number of records delivered. Cursors are released before
    /// this returns, on success and on error alike.
    pub async fn for_each<F>(
        mut self,
        doc_type: &str,
        index_name: &str,
        body: &[u8],
        mut consumer: F,
    ) -> Result<u64>
    where
        F: FnMut(M::Output) -> ControlFlow<()>,
    {
        metrics::record_scroll_opened();
        let outcome = self.drive(doc_type, index_name, body, &mut consumer).await;
        self.cursors.release().await;
        metrics::record_scroll_closed();

        match &outcome {
            Ok(count) => {
                debug!(records = count, rounds = self.rounds, "Scroll session finished");
                metrics::record_scroll_records(self.delivered as usize);
            }
            Err(e) => warn!(error = %e, rounds = self.rounds, "Scroll session failed"),
        }
        outcome
    }

    /// Run the query and gather every record.
    pub async fn collect(self, doc_type: &str, index_name: &str, body: &[u8]) -> Result<Vec<M::Output>> {
        let mut records = Vec::new();
        self.for_each(doc_type, index_name, body, |record| {
            records.push(record);
            ControlFlow::Continue(())
        })
        .await?;
        Ok(records)
    }

    async fn drive<F>(&mut self, doc_type: &str, index_name: &str, body: &[u8], consumer: &mut F) -> Result<u64>
    where
        F: FnMut(M::Output) -> ControlFlow<()>,
    {
        let mut page_body = self
            .transport
            .post_query(true, doc_type, index_name, body)
            .await?
            .into_body(|| "404 for query?".to_string())?;

        loop {
            let page = parse_page(&page_body, self.materializer)?;
            if let Some(id) = page.scroll_id.as_deref() {
                self.cursors.add(id);
            }

            let finished = page.all_hits_read() || page.zero_hits();
            let scroll_id = page.scroll_id;
            for record in page.records {
                self.delivered += 1;
                if consumer(record).is_break() {
                    debug!(delivered = self.delivered, "Scroll stopped by consumer");
                    return Ok(self.delivered);
                }
            }
            if finished {
                return Ok(self.delivered);
            }

            if let Some(max) = self.max_rounds {
                if self.rounds >= max {
                    return Err(DocStoreError::ScrollRoundsExceeded(max));
                }
            }
            let scroll_id = scroll_id.ok_or_else(|| {
                DocStoreError::MalformedResponse("partial page without _scroll_id".into())
            })?;

            self.rounds += 1;
            metrics::record_scroll_round();
            page_body = self
                .transport
                .get_scroll(&scroll_id)
                .await?
                .into_body(|| format!("404 for scrollId:{}", scroll_id))?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::materializer::RawSourceMaterializer;
    use crate::transport::{ScriptedTransport, TransportCall, TransportResponse};
    use serde_json::{json, Value};

    fn hits(from: usize, count: usize) -> Vec<Value> {
        (from..from + count)
            .map(|i| json!({ "_id": i.to_string(), "_source": { "n": i } }))
            .collect()
    }

    fn scripted() -> Arc<ScriptedTransport> {
        Arc::new(ScriptedTransport::new())
    }

    #[tokio::test]
    async fn test_single_page_all_hits_read() {
        let transport = scripted();
        transport.push_page(2, Some("s1"), &hits(0, 2));

        let session = ScrollSession::new(transport.clone(), &RawSourceMaterializer, None);
        let records = session.collect("t", "i", b"{}").await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(transport.pending_responses(), 0);
        assert_eq!(transport.cleared_scroll_ids(), vec![vec!["s1".to_string()]]);
    }

    #[tokio::test]
    async fn test_scrolls_until_zero_hits() {
        let transport = scripted();
        transport.push_page(100, Some("s1"), &hits(0, 50));
        transport.push_page(100, Some("s2"), &hits(50, 50));
        transport.push_page(100, Some("s2"), &[]);

        let session = ScrollSession::new(transport.clone(), &RawSourceMaterializer, None);
        let records = session.collect("t", "i", b"{}").await.unwrap();

        assert_eq!(records.len(), 100);
        assert_eq!(records[99].id, "99");
        // Deduplicated, in first-seen order, one release call
        assert_eq!(
            transport.cleared_scroll_ids(),
            vec![vec!["s1".to_string(), "s2".to_string()]]
        );
        let scrolls = transport
            .calls()
            .into_iter()
            .filter(|c| matches!(c, TransportCall::GetScroll { .. }))
            .count();
        assert_eq!(scrolls, 2);
    }

    #[tokio::test]
    async fn test_zero_hit_first_page_makes_no_scroll_call() {
        let transport = scripted();
        transport.push_page(0, Some("s1"), &[]);

        let session = ScrollSession::new(transport.clone(), &RawSourceMaterializer, None);
        let count = session.for_each("t", "i", b"{}", |_| ControlFlow::Continue(())).await.unwrap();

        assert_eq!(count, 0);
        assert_eq!(transport.cleared_scroll_ids(), vec![vec!["s1".to_string()]]);
    }

    #[tokio::test]
    async fn test_zero_total_page_with_hits_is_terminal() {
        let transport = scripted();
        transport.push_page(0, Some("s1"), &hits(0, 2));
        transport.push_page(5, Some("s2"), &hits(2, 3));

        let session = ScrollSession::new(transport.clone(), &RawSourceMaterializer, None);
        let count = session.for_each("t", "i", b"{}", |_| ControlFlow::Continue(())).await.unwrap();

        assert_eq!(count, 2);
        assert_eq!(transport.pending_responses(), 1);
        assert!(!transport
            .calls()
            .iter()
            .any(|c| matches!(c, TransportCall::GetScroll { .. })));
        assert_eq!(transport.cleared_scroll_ids(), vec![vec!["s1".to_string()]]);
    }

    #[tokio::test]
    async fn test_no_release_call_without_cursor_ids() {
        let transport = scripted();
        transport.push_page(1, None, &hits(0, 1));

        let session = ScrollSession::new(transport.clone(), &RawSourceMaterializer, None);
        session.collect("t", "i", b"{}").await.unwrap();
        assert!(transport.cleared_scroll_ids().is_empty());
    }

    #[tokio::test]
    async fn test_consumer_break_stops_and_releases() {
        let transport = scripted();
        transport.push_page(100, Some("s1"), &hits(0, 50));
        transport.push_page(100, Some("s2"), &hits(50, 50));

        let mut seen = 0;
        let session = ScrollSession::new(transport.clone(), &RawSourceMaterializer, None);
        let count = session
            .for_each("t", "i", b"{}", |_| {
                seen += 1;
                if seen == 10 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .await
            .unwrap();

        assert_eq!(count, 10);
        assert_eq!(transport.pending_responses(), 1);
        assert_eq!(transport.cleared_scroll_ids(), vec![vec!["s1".to_string()]]);
    }

    #[tokio::test]
    async fn test_error_mid_scroll_still_releases() {
        let transport = scripted();
        transport.push_page(100, Some("s1"), &hits(0, 50));
        transport.push_response(TransportResponse::new(500, "boom"));

        let session = ScrollSession::new(transport.clone(), &RawSourceMaterializer, None);
        let err = session.collect("t", "i", b"{}").await.unwrap_err();

        assert!(matches!(err, DocStoreError::WireProtocol { status: 500, .. }));
        assert_eq!(transport.cleared_scroll_ids(), vec![vec!["s1".to_string()]]);
    }

    #[tokio::test]
    async fn test_release_failure_does_not_mask_result() {
        let transport = scripted();
        transport.fail_clear(true);
        transport.push_page(1, Some("s1"), &hits(0, 1));

        let session = ScrollSession::new(transport.clone(), &RawSourceMaterializer, None);
        let records = session.collect("t", "i", b"{}").await.unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_max_rounds_exceeded() {
        let transport = scripted();
        transport.push_page(100, Some("s1"), &hits(0, 10));
        transport.push_page(100, Some("s1"), &hits(10, 10));

        let session = ScrollSession::new(transport.clone(), &RawSourceMaterializer, Some(1));
        let err = session.collect("t", "i", b"{}").await.unwrap_err();

        assert!(matches!(err, DocStoreError::ScrollRoundsExceeded(1)));
        assert_eq!(transport.cleared_scroll_ids(), vec![vec!["s1".to_string()]]);
    }

    #[tokio::test]
    async fn test_partial_page_without_scroll_id_is_malformed() {
        let transport = scripted();
        transport.push_page(10, None, &hits(0, 5));

        let session = ScrollSession::new(transport.clone(), &RawSourceMaterializer, None);
        let err = session.collect("t", "i", b"{}").await.unwrap_err();
        assert!(matches!(err, DocStoreError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_cursor_set_dedup_and_idempotent_release() {
        let transport = scripted();
        let mut cursors = CursorSet::new(transport.clone());
        cursors.add("a");
        cursors.add("b");
        cursors.add("a");
        assert_eq!(cursors.ids(), &["a".to_string(), "b".to_string()]);

        cursors.release().await;
        cursors.release().await;
        assert_eq!(transport.cleared_scroll_ids().len(), 1);
    }

    #[tokio::test]
    async fn test_dropped_cursor_set_releases_in_background() {
        let transport = scripted();
        {
            let mut cursors = CursorSet::new(transport.clone());
            cursors.add("orphan");
        }
        for _ in 0..50 {
            if !transport.cleared_scroll_ids().is_empty() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(transport.cleared_scroll_ids(), vec![vec!["orphan".to_string()]]);
    }
}
