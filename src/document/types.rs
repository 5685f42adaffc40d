//! Core document types

use std::path::PathBuf;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::fingerprint::Fingerprint;

/// Facts about the source document established at startup
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    #[serde(skip)]
    pub path: PathBuf,
    pub file_name: String,
    pub file_size: u64,
    /// Modification time, serialized as milliseconds since the Unix epoch
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_modified: DateTime<Utc>,
    pub fingerprint: Fingerprint,
    /// `None` when the document could not be decoded at startup
    pub page_count: Option<usize>,
}

/// Decoded whole-source document
///
/// Holds the full source bytes together with the page count reported by the
/// extractor, tagged with the fingerprint they were loaded under. Never
/// mutated after construction.
#[derive(Debug)]
pub struct SourceDocument {
    fingerprint: Fingerprint,
    bytes: Bytes,
    page_count: usize,
}

impl SourceDocument {
    pub fn new(fingerprint: Fingerprint, bytes: Bytes, page_count: usize) -> Self {
        Self {
            fingerprint,
            bytes,
            page_count,
        }
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Size of the source in bytes
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Cache key for derived page artifacts
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct PageKey {
    pub fingerprint: Fingerprint,
    /// 1-based page index
    pub page: usize,
}

impl PageKey {
    pub fn new(fingerprint: Fingerprint, page: usize) -> Self {
        Self { fingerprint, page }
    }
}
