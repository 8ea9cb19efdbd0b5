// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Document store coordinator.
//!
//! The [`DocumentStore`] ties together the components:
//! - Query compilation ([`crate::search::QueryCompiler`])
//! - Page parsing and record materialization
//! - Scroll sessions with guaranteed cursor release
//! - Index lifecycle for registered mappings
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use elastic_docstore::{DocStoreConfig, DocumentStore};
//! use elastic_docstore::schema::{DocMapping, DocumentType};
//! use elastic_docstore::search::{FilterExpr, SearchQuery};
//! use elastic_docstore::transport::ScriptedTransport;
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let transport = Arc::new(ScriptedTransport::new());
//! transport.push_page(1, None, &[json!({"_id": "1", "_source": {"status": "NEW"}})]);
//!
//! let store = DocumentStore::new(transport, DocStoreConfig::default());
//! let order = DocumentType::new("order", DocMapping::new("order", "order").text("status"));
//! store.register(&order);
//!
//! let query = SearchQuery::new(&order).filter(FilterExpr::eq("status", "NEW"));
//! let orders = store.find_list(&query).await.unwrap();
//! assert_eq!(orders[0].id.as_deref(), Some("1"));
//! # }
//! ```

mod index_api;
mod search_api;
mod types;

pub use types::PagedList;

use std::sync::Arc;

use tracing::debug;

use crate::config::DocStoreConfig;
use crate::error::Result;
use crate::metrics;
use crate::schema::{MappingRegistry, RecordType};
use crate::transport::SearchTransport;

/// Query facade and index lifecycle over one search engine.
///
/// # Thread Safety
///
/// `Send + Sync`; share it behind an `Arc`. The registry is guarded by a
/// `parking_lot::RwLock` and the transport is shared.
pub struct DocumentStore {
    pub(super) transport: Arc<dyn SearchTransport>,
    pub(super) config: DocStoreConfig,
    pub(super) registry: MappingRegistry,
}

impl DocumentStore {
    pub fn new(transport: Arc<dyn SearchTransport>, config: DocStoreConfig) -> Self {
        Self {
            transport,
            config,
            registry: MappingRegistry::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &DocStoreConfig {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &MappingRegistry {
        &self.registry
    }

    #[must_use]
    pub fn transport(&self) -> &Arc<dyn SearchTransport> {
        &self.transport
    }

    /// Register a record type's mapping for index lifecycle.
    pub fn register<R: RecordType>(&self, record_type: &R) {
        debug!(type_key = record_type.type_key(), "Registering document mapping");
        self.registry
            .register(record_type.type_key(), record_type.doc_mapping().clone());
    }
}

/// Record the outcome of a facade operation.
pub(super) fn observe<T>(operation: &'static str, result: Result<T>) -> Result<T> {
    match &result {
        Ok(_) => metrics::record_operation(operation, "success"),
        Err(e) => {
            metrics::record_operation(operation, "error");
            metrics::record_error(operation, e.kind());
        }
    }
    result
}
