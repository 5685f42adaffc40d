//! Shared fixtures for the HTTP tests

#![allow(dead_code)]

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::Router;
use tempfile::NamedTempFile;

use pdf_pager::config::{Config, Environment};
use pdf_pager::document::{DocumentService, ExtractError, PageExtractor, PipelineConfig};
use pdf_pager::routes::build_router;
use pdf_pager::state::AppState;

pub const SOURCE: &[u8] = b"%PDF-1.7\n% ten page test document\n%%EOF\n";

/// Extractor that fabricates one artifact per page and counts its calls
pub struct CountingExtractor {
    pages: usize,
    extractions: AtomicUsize,
    failures_remaining: AtomicUsize,
}

impl CountingExtractor {
    pub fn new(pages: usize) -> Self {
        Self {
            pages,
            extractions: AtomicUsize::new(0),
            failures_remaining: AtomicUsize::new(0),
        }
    }

    pub fn fail_next(&self, count: usize) {
        self.failures_remaining.store(count, Ordering::SeqCst);
    }

    pub fn extractions(&self) -> usize {
        self.extractions.load(Ordering::SeqCst)
    }
}

impl PageExtractor for CountingExtractor {
    fn content_type(&self) -> &'static str {
        "application/pdf"
    }

    fn page_count(&self, _source: &[u8]) -> Result<usize, ExtractError> {
        Ok(self.pages)
    }

    fn extract_page(&self, _source: &[u8], page: usize) -> Result<Vec<u8>, ExtractError> {
        self.extractions.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(ExtractError::new("corrupt page tree"));
        }
        Ok(format!("%PDF-1.7 page {}", page).into_bytes())
    }
}

/// A running app over a temporary source file
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub extractor: Arc<CountingExtractor>,
    pub source: NamedTempFile,
}

pub async fn spawn_app(environment: Environment) -> TestApp {
    let mut source = NamedTempFile::new().unwrap();
    source.write_all(SOURCE).unwrap();
    source.flush().unwrap();

    let extractor = Arc::new(CountingExtractor::new(10));
    let document = DocumentService::open(source.path(), extractor.clone(), PipelineConfig::default())
        .await
        .unwrap();

    let mut config = Config::default();
    config.document.path = source.path().to_path_buf();
    config.document.warm_up = false;
    config.http.environment = environment;

    let state = AppState::new(config, document);
    TestApp {
        router: build_router(state.clone()),
        state,
        extractor,
        source,
    }
}
