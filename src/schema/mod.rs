// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Record types and their document mappings.
//!
//! The document store does not own records. A host record layer describes
//! each type through [`RecordType`]: how property paths resolve, which paths
//! cross a one-to-many ("many") relation, and how to build a record from an
//! engine `_source` document or from sparse field values.
//!
//! # Example
//!
//! ```rust
//! use elastic_docstore::schema::{DocMapping, DocumentType, RecordType};
//!
//! let order = DocumentType::new(
//!     "order",
//!     DocMapping::new("order", "order")
//!         .text("status")
//!         .raw("customer.name", "customer.name.raw")
//!         .many("lines")
//!         .long("lines.qty"),
//! );
//!
//! let path = order.expression_path("lines.qty").unwrap();
//! assert!(path.contains_many);
//! assert_eq!(path.many_root_path.as_deref(), Some("lines"));
//!
//! let path = order.expression_path("customer.name").unwrap();
//! assert!(!path.contains_many);
//! assert_eq!(path.raw_field_name, "customer.name.raw");
//! ```
//!
//! # Design
//!
//! - **Mapping is the source of truth**: path resolution derives from
//!   [`DocMapping`], so a host only implements record construction
//! - **Shortest many prefix wins**: `lines.notes.text` scopes to `lines`
//! - **Registry**: [`MappingRegistry`] keeps every mapped type for index
//!   lifecycle, guarded by `parking_lot::RwLock`

mod document;
mod mapping;
mod record_type;
mod registry;

pub use document::{Document, DocumentType};
pub use mapping::{DocMapping, DocPropertyType, PropertyMapping};
pub use record_type::{ExpressionPath, RecordType};
pub use registry::MappingRegistry;
