//! PDF page extraction with MuPDF
//!
//! MuPDF documents are not `Send`, so nothing MuPDF-owned outlives a call:
//! every operation opens a fresh document from the shared source bytes, does
//! its work and drops it. Callers run these methods on the blocking pool.

use mupdf::pdf::{PdfDocument, PdfWriteOptions};

use crate::document::{ExtractError, PageExtractor};

/// Copies a single page of a PDF into a new standalone PDF
#[derive(Debug, Default, Clone, Copy)]
pub struct MupdfExtractor;

impl MupdfExtractor {
    pub fn new() -> Self {
        Self
    }

    fn open(source: &[u8]) -> Result<PdfDocument, ExtractError> {
        PdfDocument::from_bytes(source).map_err(Into::into)
    }
}

impl PageExtractor for MupdfExtractor {
    fn content_type(&self) -> &'static str {
        "application/pdf"
    }

    fn page_count(&self, source: &[u8]) -> Result<usize, ExtractError> {
        let doc = Self::open(source)?;
        let count = doc.page_count()?;
        usize::try_from(count)
            .map_err(|_| ExtractError::new(format!("Invalid page count: {}", count)))
    }

    fn extract_page(&self, source: &[u8], page: usize) -> Result<Vec<u8>, ExtractError> {
        let mut doc = Self::open(source)?;
        let count = doc.page_count()?;

        // MuPDF page indices are 0-based
        let keep = page
            .checked_sub(1)
            .and_then(|i| i32::try_from(i).ok())
            .filter(|&i| i < count)
            .ok_or_else(|| ExtractError::new(format!("Page {} not in document ({} pages)", page, count)))?;

        // Deleting from the end keeps the remaining indices stable. Attributes
        // inherited from the page tree stay reachable from the kept page.
        for index in (0..count).rev().filter(|&i| i != keep) {
            doc.delete_page(index)?;
        }

        // Garbage collection drops objects only the deleted pages used
        let mut options = PdfWriteOptions::default();
        options.set_garbage_level(3);

        let mut buffer = Vec::new();
        doc.write_to_with_options(&mut buffer, options)?;
        Ok(buffer)
    }
}
