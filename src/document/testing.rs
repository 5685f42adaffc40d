//! Test helpers shared by the document module tests

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tempfile::NamedTempFile;

use super::traits::{ExtractError, PageExtractor};

/// Extractor that fabricates artifacts and counts its calls
pub struct MockExtractor {
    pub pages: usize,
    pub delay: Duration,
    decodes: AtomicUsize,
    extractions: AtomicUsize,
    failures_remaining: AtomicUsize,
}

impl MockExtractor {
    pub fn new(pages: usize) -> Self {
        Self {
            pages,
            delay: Duration::ZERO,
            decodes: AtomicUsize::new(0),
            extractions: AtomicUsize::new(0),
            failures_remaining: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Make the next `count` extractions fail
    pub fn fail_next(&self, count: usize) {
        self.failures_remaining.store(count, Ordering::SeqCst);
    }

    pub fn decodes(&self) -> usize {
        self.decodes.load(Ordering::SeqCst)
    }

    pub fn extractions(&self) -> usize {
        self.extractions.load(Ordering::SeqCst)
    }
}

impl PageExtractor for MockExtractor {
    fn content_type(&self) -> &'static str {
        "application/pdf"
    }

    fn page_count(&self, _source: &[u8]) -> Result<usize, ExtractError> {
        self.decodes.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        Ok(self.pages)
    }

    fn extract_page(&self, source: &[u8], page: usize) -> Result<Vec<u8>, ExtractError> {
        self.extractions.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(self.delay);

        let failing = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(ExtractError::new("simulated extraction failure"));
        }

        Ok(format!("page {} of {} source bytes", page, source.len()).into_bytes())
    }
}

/// Write `contents` to a fresh temporary file
pub fn source_file(contents: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents).unwrap();
    file.flush().unwrap();
    file
}
