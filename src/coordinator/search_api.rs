//! Query API for DocumentStore
//!
//! # Architecture
//!
//! ```text
//! find_list / find_paged_list      find_each / find_each_raw_source
//!       │                                   │
//!       ├─→ QueryCompiler                   ├─→ QueryCompiler
//!       ├─→ post_query (no scroll)          └─→ ScrollSession
//!       └─→ parse one bounded page                 ├─→ post_query (scroll)
//!                                                  ├─→ get_scroll ...
//! get_by_id                                        └─→ clear_scroll_ids
//!       └─→ get_doc_source (404 → None)
//! ```

use std::ops::ControlFlow;
use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::metrics::LatencyTimer;
use crate::schema::RecordType;
use crate::search::{
    parse_page, QueryCompiler, QueryValue, RawSource, RawSourceMaterializer, RecordMaterializer,
    ScalarWriter, ScrollSession, SearchPage, SearchQuery,
};

use super::{observe, DocumentStore, PagedList};

impl DocumentStore {
    // ═══════════════════════════════════════════════════════════════════════════
    // Bounded queries
    // ═══════════════════════════════════════════════════════════════════════════

    /// Fetch one bounded page of records. Never scrolls.
    pub async fn find_list<R: RecordType>(&self, query: &SearchQuery<'_, R>) -> Result<Vec<R::Record>> {
        let _timer = LatencyTimer::new("find_list");
        let result = self.fetch_page(query).await.map(|page| page.records);
        observe("find_list", result)
    }

    /// Fetch one bounded page with the query's total hit count.
    pub async fn find_paged_list<R: RecordType>(
        &self,
        query: &SearchQuery<'_, R>,
    ) -> Result<PagedList<R::Record>> {
        let _timer = LatencyTimer::new("find_paged_list");
        let result = self.fetch_page(query).await.map(|page| PagedList {
            first_row: query.first_row_value(),
            max_rows: query.max_rows_value(),
            list: page.records,
            total: page.total,
        });
        observe("find_paged_list", result)
    }

    async fn fetch_page<R: RecordType>(&self, query: &SearchQuery<'_, R>) -> Result<SearchPage<R::Record>> {
        let mapping = query.record_type().doc_mapping();
        let body = QueryCompiler::compile(query)?;

        let response = self
            .transport
            .post_query(false, &mapping.doc_type, &mapping.index_name, &body)
            .await?;
        let body = response.into_body(|| "404 for query?".to_string())?;

        let page = parse_page(&body, &RecordMaterializer::for_query(query))?;
        debug!(
            index = %mapping.index_name,
            total = page.total,
            count = page.records.len(),
            "Search page read"
        );
        Ok(page)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Streaming queries
    // ═══════════════════════════════════════════════════════════════════════════

    /// Stream every matching record through `consumer`, scrolling as needed.
    ///
    /// Return `ControlFlow::Break(())` from the consumer to stop early.
    /// Scroll cursors are released before this returns.
    pub async fn find_each<R, F>(&self, query: &SearchQuery<'_, R>, consumer: F) -> Result<u64>
    where
        R: RecordType,
        F: FnMut(R::Record) -> ControlFlow<()>,
    {
        let _timer = LatencyTimer::new("find_each");
        let materializer = RecordMaterializer::for_query(query);
        let result = self.scroll(query, &materializer, consumer).await;
        observe("find_each", result)
    }

    /// Stream every matching hit as raw `_source` text, without building
    /// records.
    pub async fn find_each_raw_source<R, F>(&self, query: &SearchQuery<'_, R>, consumer: F) -> Result<u64>
    where
        R: RecordType,
        F: FnMut(RawSource) -> ControlFlow<()>,
    {
        let _timer = LatencyTimer::new("find_each_raw_source");
        let result = self.scroll(query, &RawSourceMaterializer, consumer).await;
        if let Ok(count) = &result {
            debug!(
                index = %query.record_type().doc_mapping().index_name,
                count,
                "Raw source entries streamed"
            );
        }
        observe("find_each_raw_source", result)
    }

    async fn scroll<R, M, F>(&self, query: &SearchQuery<'_, R>, materializer: &M, consumer: F) -> Result<u64>
    where
        R: RecordType,
        M: crate::search::HitMaterializer,
        F: FnMut(M::Output) -> ControlFlow<()>,
    {
        let mapping = query.record_type().doc_mapping();
        let body = QueryCompiler::compile(query)?;
        ScrollSession::new(Arc::clone(&self.transport), materializer, self.config.max_scroll_rounds)
            .for_each(&mapping.doc_type, &mapping.index_name, &body, consumer)
            .await
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Lookup
    // ═══════════════════════════════════════════════════════════════════════════

    /// Fetch a single document by id. A missing document is `Ok(None)`.
    pub async fn get_by_id<R: RecordType>(
        &self,
        record_type: &R,
        id: impl Into<QueryValue>,
    ) -> Result<Option<R::Record>> {
        let _timer = LatencyTimer::new("get_by_id");
        let result = self.lookup(record_type, &ScalarWriter::as_text(&id.into())).await;
        observe("get_by_id", result)
    }

    async fn lookup<R: RecordType>(&self, record_type: &R, id: &str) -> Result<Option<R::Record>> {
        let mapping = record_type.doc_mapping();
        let response = self
            .transport
            .get_doc_source(&mapping.doc_type, &mapping.index_name, id)
            .await?;

        let body = match response.into_body(|| format!("404 for docId:{}", id)) {
            Ok(body) => body,
            Err(e) if e.is_not_found() => {
                debug!(index = %mapping.index_name, id, "Document not found");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let mut record = record_type.read_source(&body)?;
        record_type.set_id(&mut record, id);
        Ok(Some(record))
    }
}
