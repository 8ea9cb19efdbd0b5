// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search Infrastructure
//!
//! Typed filter trees compiled to the engine query DSL, plus parsing and
//! materialization of the results.
//!
//! # Architecture
//!
//! ```text
//! SearchQuery { FilterExpr, order, window, selection }
//!     ↓
//!     QueryCompiler → JSON body ({"query": {"filtered": ...}})
//!     ↓
//! SearchTransport (post_query / get_scroll)
//!     ↓
//!     ResultPage::parse → HitMaterializer → SearchPage<T>
//!     ↓
//!     ScrollSession (streaming, guaranteed cursor release)
//! ```
//!
//! # Example
//!
//! ```rust
//! use elastic_docstore::schema::{DocMapping, DocumentType};
//! use elastic_docstore::search::{FilterExpr, QueryCompiler, SearchQuery};
//!
//! let order = DocumentType::new(
//!     "order",
//!     DocMapping::new("order", "order").text("status").many("lines").long("lines.qty"),
//! );
//!
//! let query = SearchQuery::new(&order)
//!     .filter(FilterExpr::eq("status", "NEW").and(FilterExpr::gt("lines.qty", 1)))
//!     .max_rows(50);
//!
//! let doc = QueryCompiler::compile_value(&query).unwrap();
//! assert_eq!(doc["size"], 50);
//! assert_eq!(
//!     doc["query"]["filtered"]["filter"]["bool"]["must"][1]["nested"]["path"],
//!     "lines"
//! );
//! ```
//!
//! # Operator mapping
//!
//! ```text
//! eq / ne              term on raw field (ne under must_not); null → not exists
//! gt / ge / lt / le    range {gt|gte|lt|lte} on raw field
//! in / not in          terms on raw field
//! id in                ids {values}
//! like                 wildcard, `%` → `*`, `_` → `?`, lowercased
//! starts / ends / contains   prefix / wildcard on analysed field, lowercased
//! ieq                  match per lowercased token (bool must if several)
//! is (not) null        exists, under must_not for null
//! and / or / not       bool must / should / must_not
//! ```

mod compiler;
mod materializer;
mod query;
mod query_builder;
mod result_parser;
mod scalar;
mod scroll;

pub use compiler::QueryCompiler;
pub use materializer::{
    FieldsMaterializer, HitMaterializer, RawSource, RawSourceMaterializer, RecordMaterializer,
    SourceMaterializer,
};
pub use query::{FetchPath, FetchProperties, OrderBy, SearchQuery, Selection};
pub use query_builder::{FilterBuilder, FilterExpr, LikeType, QueryValue, RangeBound, RangeOp};
pub use result_parser::{parse_page, Hit, ResultPage, SearchPage};
pub use scalar::ScalarWriter;
pub use scroll::{CursorSet, ScrollSession};
