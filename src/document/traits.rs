//! Document traits
//!
//! The page pipeline talks to the extraction library only through
//! [`PageExtractor`]. Implementations are blocking; the pipeline runs them on
//! the blocking thread pool.

use thiserror::Error;

/// Failure reported by an extractor
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ExtractError(String);

impl ExtractError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<mupdf::Error> for ExtractError {
    fn from(err: mupdf::Error) -> Self {
        ExtractError(err.to_string())
    }
}

/// Produces standalone single-page artifacts from a whole source document
pub trait PageExtractor: Send + Sync + 'static {
    /// MIME type of the artifacts this extractor produces
    fn content_type(&self) -> &'static str;

    /// Decode the source and report its number of pages
    fn page_count(&self, source: &[u8]) -> Result<usize, ExtractError>;

    /// Build a standalone artifact containing only `page` (1-based)
    fn extract_page(&self, source: &[u8], page: usize) -> Result<Vec<u8>, ExtractError>;
}
