//! # Elastic Docstore
//!
//! A document-store query engine: compiles typed filter trees into the
//! search engine's query DSL, parses result envelopes into records and
//! streams large result sets over scroll cursors.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    DocumentStore (facade)                   │
//! │  • find_list / find_paged_list: one bounded page           │
//! │  • find_each / find_each_raw_source: scroll everything     │
//! │  • get_by_id: single source fetch, 404 → None              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       QueryCompiler                         │
//! │  • FilterExpr → bool / filter JSON                         │
//! │  • nested grouping for paths under many relations          │
//! │  • from / size / _source / fields / sort                   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                    (SearchTransport round-trip)
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │              ResultPage → HitMaterializer                   │
//! │  • full _source, sparse fields, or raw source text         │
//! │  • ScrollSession releases every cursor it saw              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::ops::ControlFlow;
//! use std::sync::Arc;
//! use elastic_docstore::{DocStoreConfig, DocumentStore};
//! use elastic_docstore::schema::{DocMapping, DocumentType};
//! use elastic_docstore::search::{FilterBuilder, SearchQuery};
//! use elastic_docstore::transport::SearchTransport;
//!
//! async fn run(transport: Arc<dyn SearchTransport>) -> Result<(), elastic_docstore::DocStoreError> {
//!     let store = DocumentStore::new(transport, DocStoreConfig::default());
//!
//!     let order = DocumentType::new(
//!         "order",
//!         DocMapping::new("order", "order")
//!             .text("status")
//!             .raw("customer.name", "customer.name.raw")
//!             .many("lines")
//!             .long("lines.qty"),
//!     );
//!     store.register(&order);
//!     store.create_indexes().await?;
//!
//!     let filter = FilterBuilder::new()
//!         .eq("status", "NEW")
//!         .ge("lines.qty", 10)
//!         .build_and();
//!     let query = SearchQuery::new(&order).filter_opt(filter).order_by_asc("customer.name");
//!
//!     let page = store.find_paged_list(&query.clone().max_rows(20)).await?;
//!     println!("{} of {}", page.list.len(), page.total);
//!
//!     store
//!         .find_each(&query, |order| {
//!             println!("{:?}", order.id);
//!             ControlFlow::Continue(())
//!         })
//!         .await?;
//!
//!     let one = store.get_by_id(&order, "o-1").await?;
//!     println!("{:?}", one);
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! See [`DocStoreConfig`] for all configuration options.
//!
//! ## Modules
//!
//! - [`coordinator`]: The [`DocumentStore`] facade and index lifecycle
//! - [`search`]: Filter trees, compiler, result parsing, scroll sessions
//! - [`schema`]: Record types, document mappings, mapping registry
//! - [`transport`]: The engine round-trip boundary and a scripted transport
//! - [`metrics`]: `metrics` crate instrumentation

pub mod config;
pub mod coordinator;
pub mod error;
pub mod metrics;
pub mod schema;
pub mod search;
pub mod transport;

// Note: We don't expose a `tracing` module to avoid conflict with the tracing crate

pub use config::DocStoreConfig;
pub use coordinator::{DocumentStore, PagedList};
pub use error::{DocStoreError, ErrorCategory, Result};
pub use schema::{Document, DocumentType, RecordType};
pub use search::{FilterBuilder, FilterExpr, QueryValue, SearchQuery};
pub use transport::{SearchTransport, TransportError, TransportResponse};
