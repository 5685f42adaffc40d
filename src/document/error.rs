//! Document error types
//!
//! Errors produced by the page pipeline. The type is `Clone` because a single
//! failed derivation is delivered to every request that was coalesced onto it.

use std::sync::Arc;

use thiserror::Error;

use super::fingerprint::Fingerprint;

/// Unified document error type
#[derive(Debug, Clone, Error)]
pub enum DocumentError {
    /// Source file could not be read or stat'd
    #[error("IO error: {0}")]
    Io(Arc<std::io::Error>),

    /// Source bytes on disk no longer match the fingerprint taken at startup
    #[error("Source document changed on disk (expected {expected}, found {actual})")]
    SourceChanged {
        expected: Fingerprint,
        actual: Fingerprint,
    },

    /// Requested page is not a valid 1-based index
    #[error("Page {page} is out of range")]
    PageOutOfRange {
        page: usize,
        page_count: Option<usize>,
    },

    /// Source document could not be decoded
    #[error("Failed to decode source document: {0}")]
    Decode(String),

    /// Extraction of a single page failed
    #[error("Failed to derive page {page}: {reason}")]
    Derivation { page: usize, reason: String },

    /// Timeout error
    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    /// The shared computation went away without producing a result
    #[error("Computation was cancelled before completing")]
    Cancelled,
}

impl From<std::io::Error> for DocumentError {
    fn from(err: std::io::Error) -> Self {
        DocumentError::Io(Arc::new(err))
    }
}

impl DocumentError {
    /// Whether the error means the source file is missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, DocumentError::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

/// Result type alias for document operations
pub type DocumentResult<T> = std::result::Result<T, DocumentError>;
