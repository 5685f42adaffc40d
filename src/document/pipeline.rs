//! Page derivation pipeline
//!
//! Turns a `(fingerprint, page)` request into a single-page artifact:
//!
//! ```text
//! derive_or_fetch ──► PageCache hit? ──yes──► artifact
//!                          │ no
//!                          ▼
//!                  in-flight for key? ──yes──► wait on shared result
//!                          │ no
//!                          ▼
//!          SourceCache ──► PageExtractor ──► PageCache.put ──► all waiters
//! ```

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use tokio::time::{timeout, Duration, Instant};

use super::cache::{PageCache, DEFAULT_PAGE_CACHE_CAPACITY};
use super::coalesce::Coalescer;
use super::error::{DocumentError, DocumentResult};
use super::fingerprint::Fingerprint;
use super::source::SourceCache;
use super::traits::PageExtractor;
use super::types::PageKey;

/// Default timeout for extracting a single page
pub const DEFAULT_DERIVE_TIMEOUT_SECS: u64 = 30;

/// Pipeline configuration options
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximum number of page artifacts kept in memory
    pub page_cache_capacity: usize,
    /// Upper bound for one extractor call
    pub derive_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            page_cache_capacity: DEFAULT_PAGE_CACHE_CAPACITY,
            derive_timeout: Duration::from_secs(DEFAULT_DERIVE_TIMEOUT_SECS),
        }
    }
}

/// Cached, coalesced page derivation
#[derive(Clone)]
pub struct PagePipeline {
    inner: Arc<PipelineInner>,
}

struct PipelineInner {
    source: SourceCache,
    pages: PageCache,
    in_flight: Coalescer<PageKey, Bytes>,
    extractor: Arc<dyn PageExtractor>,
    derive_timeout: Duration,
}

impl PagePipeline {
    pub fn new(
        path: impl AsRef<Path>,
        extractor: Arc<dyn PageExtractor>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            inner: Arc::new(PipelineInner {
                source: SourceCache::new(path, Arc::clone(&extractor)),
                pages: PageCache::new(config.page_cache_capacity),
                in_flight: Coalescer::new("page"),
                extractor,
                derive_timeout: config.derive_timeout,
            }),
        }
    }

    /// Return the artifact for `page`, deriving it at most once per key
    ///
    /// Cache hits return without touching the source cache or the in-flight
    /// map. Concurrent misses for the same key share one derivation and all
    /// observe its result, success or error. Failures are not cached.
    pub async fn derive_or_fetch(
        &self,
        fingerprint: &Fingerprint,
        page: usize,
    ) -> DocumentResult<Bytes> {
        if page == 0 {
            return Err(DocumentError::PageOutOfRange {
                page,
                page_count: None,
            });
        }

        let key = PageKey::new(fingerprint.clone(), page);

        if let Some(artifact) = self.inner.pages.get(&key) {
            tracing::trace!(page, "Page artifact served from cache");
            return Ok(artifact);
        }

        let this = self.clone();
        self.inner
            .in_flight
            .run(key.clone(), move || async move { this.derive(key).await })
            .await
    }

    async fn derive(&self, key: PageKey) -> DocumentResult<Bytes> {
        let page = key.page;
        let started = Instant::now();

        let result = self.extract(&key).await;
        match &result {
            Ok(artifact) => {
                self.inner.pages.put(key, artifact.clone());
                tracing::debug!(
                    page,
                    bytes = artifact.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Derived page artifact"
                );
            }
            Err(DocumentError::PageOutOfRange { .. }) => {
                tracing::debug!(page, "Requested page is out of range");
            }
            Err(e) => {
                tracing::error!(page, error = %e, "Page derivation failed");
            }
        }

        result
    }

    async fn extract(&self, key: &PageKey) -> DocumentResult<Bytes> {
        let page = key.page;
        let source = self.inner.source.get(&key.fingerprint).await?;

        if page > source.page_count() {
            return Err(DocumentError::PageOutOfRange {
                page,
                page_count: Some(source.page_count()),
            });
        }

        // Offload CPU-bound extraction to the blocking pool with a timeout
        let extractor = Arc::clone(&self.inner.extractor);
        let extract_result = timeout(
            self.inner.derive_timeout,
            tokio::task::spawn_blocking(move || extractor.extract_page(source.bytes(), page)),
        )
        .await;

        let data = match extract_result {
            Ok(join_result) => join_result
                .map_err(|e| DocumentError::Derivation {
                    page,
                    reason: format!("Task join error: {}", e),
                })?
                .map_err(|e| DocumentError::Derivation {
                    page,
                    reason: e.to_string(),
                })?,
            Err(_) => return Err(DocumentError::Timeout(self.inner.derive_timeout.as_secs())),
        };

        Ok(Bytes::from(data))
    }

    /// Whether a derivation for `(fingerprint, page)` is running right now
    pub fn is_in_flight(&self, fingerprint: &Fingerprint, page: usize) -> bool {
        self.inner
            .in_flight
            .is_in_flight(&PageKey::new(fingerprint.clone(), page))
    }

    pub fn page_cache(&self) -> &PageCache {
        &self.inner.pages
    }

    pub fn source_cache(&self) -> &SourceCache {
        &self.inner.source
    }

    pub fn content_type(&self) -> &'static str {
        self.inner.extractor.content_type()
    }

    /// Get pipeline statistics
    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            pages_cached: self.inner.pages.len(),
            page_capacity: self.inner.pages.capacity(),
            in_flight: self.inner.in_flight.len(),
        }
    }

    /// Drop every cached artifact and the decoded source
    pub fn clear(&self) {
        self.inner.pages.clear();
        self.inner.source.clear();
    }
}

/// Pipeline statistics
#[derive(Debug, Clone, Copy)]
pub struct PipelineStats {
    /// Number of cached page artifacts
    pub pages_cached: usize,
    /// Page cache capacity
    pub page_capacity: usize,
    /// Number of derivations currently running
    pub in_flight: usize,
}
