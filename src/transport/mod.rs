//! Transport boundary to the search engine.
//!
//! The crate never speaks HTTP itself. Hosts plug in a [`SearchTransport`]
//! that performs the round-trips and hands back a status code and body.
//!
//! ```text
//! post_query(scroll, docType, index, body) ──→ (status, body)
//! get_scroll(scroll_id)                    ──→ (status, body)
//! get_doc_source(docType, index, id)       ──→ (status, body)
//! clear_scroll_ids(ids)                    ──→ ()   best-effort
//! ```
//!
//! [`ScriptedTransport`] replays canned responses and records calls.

pub mod traits;
pub mod scripted;

pub use traits::{SearchTransport, TransportError, TransportResponse};
pub use scripted::{ScriptedTransport, TransportCall};
