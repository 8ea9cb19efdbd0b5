// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Error types for the document store.
//!
//! Every fatal error is reported to callers as an I/O category failure.
//! Only [`DocStoreError::DocumentNotFound`] is recoverable, and `get_by_id`
//! maps it to `Ok(None)` before it ever reaches the caller.

use thiserror::Error;

use crate::transport::TransportError;

#[derive(Error, Debug)]
pub enum DocStoreError {
    #[error("Document not found: {0}")]
    DocumentNotFound(String),
    #[error("Unhandled response code {status} body:{body}")]
    WireProtocol { status: u16, body: String },
    #[error("Malformed search response: {0}")]
    MalformedResponse(String),
    #[error("Query compilation failed: {0}")]
    Compilation(String),
    #[error("JSON serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Transport failure: {0}")]
    Transport(#[from] TransportError),
    #[error("Scroll did not finish within {0} continuation rounds")]
    ScrollRoundsExceeded(u32),
    #[error("No document store mapping for type '{0}'")]
    UnmappedType(String),
}

/// Coarse error category seen at the facade boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Targeted lookup found nothing.
    NotFound,
    /// Everything else: wire, transport, serialization and compilation faults.
    Io,
}

impl DocStoreError {
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::DocumentNotFound(_) => ErrorCategory::NotFound,
            _ => ErrorCategory::Io,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.category() == ErrorCategory::NotFound
    }

    /// Short label used for metrics and log fields.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DocumentNotFound(_) => "not_found",
            Self::WireProtocol { .. } => "wire_protocol",
            Self::MalformedResponse(_) => "malformed_response",
            Self::Compilation(_) => "compilation",
            Self::Serialization(_) => "serialization",
            Self::Transport(_) => "transport",
            Self::ScrollRoundsExceeded(_) => "scroll_rounds_exceeded",
            Self::UnmappedType(_) => "unmapped_type",
        }
    }
}

impl From<DocStoreError> for std::io::Error {
    fn from(err: DocStoreError) -> Self {
        let kind = match err.category() {
            ErrorCategory::NotFound => std::io::ErrorKind::NotFound,
            ErrorCategory::Io => std::io::ErrorKind::Other,
        };
        std::io::Error::new(kind, err)
    }
}

pub type Result<T, E = DocStoreError> = std::result::Result<T, E>;
