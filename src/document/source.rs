//! Whole-source document cache
//!
//! Holds at most one decoded [`SourceDocument`], tagged with its fingerprint.
//! Loads go through a [`Coalescer`] keyed by fingerprint, so concurrent first
//! requests read and decode the file once.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use tokio::time::{timeout, Duration, Instant};

use super::coalesce::Coalescer;
use super::error::{DocumentError, DocumentResult};
use super::fingerprint::{fingerprint_bytes, Fingerprint};
use super::traits::PageExtractor;
use super::types::SourceDocument;

/// Timeout for decoding the whole source document
const DECODE_TIMEOUT_SECS: u64 = 60;

/// Single-slot cache for the decoded source document
#[derive(Clone)]
pub struct SourceCache {
    path: Arc<PathBuf>,
    extractor: Arc<dyn PageExtractor>,
    slot: Arc<Mutex<Option<Arc<SourceDocument>>>>,
    loads: Coalescer<Fingerprint, Arc<SourceDocument>>,
}

impl SourceCache {
    pub fn new(path: impl AsRef<Path>, extractor: Arc<dyn PageExtractor>) -> Self {
        Self {
            path: Arc::new(path.as_ref().to_path_buf()),
            extractor,
            slot: Arc::new(Mutex::new(None)),
            loads: Coalescer::new("source"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the decoded document for `fingerprint`, loading it if needed
    pub async fn get(&self, fingerprint: &Fingerprint) -> DocumentResult<Arc<SourceDocument>> {
        if let Some(document) = self.cached(fingerprint) {
            tracing::trace!("Source document served from cache");
            return Ok(document);
        }

        let this = self.clone();
        let expected = fingerprint.clone();
        self.loads
            .run(fingerprint.clone(), move || async move { this.load(expected).await })
            .await
    }

    /// The cached document, only if it was built from `fingerprint`
    pub fn cached(&self, fingerprint: &Fingerprint) -> Option<Arc<SourceDocument>> {
        self.slot
            .lock()
            .as_ref()
            .filter(|document| document.fingerprint() == fingerprint)
            .cloned()
    }

    /// Drop the cached document
    pub fn clear(&self) {
        let previous = self.slot.lock().take();
        if let Some(previous) = previous {
            tracing::debug!("Released source document {}", previous.fingerprint());
        }
    }

    /// Install contents that were already read and fingerprinted
    ///
    /// Decodes `data` once under `fingerprint` without hashing it again.
    /// Used at startup, where the fingerprint comes from these same bytes.
    pub async fn seed(&self, fingerprint: Fingerprint, data: Bytes) -> DocumentResult<Arc<SourceDocument>> {
        if let Some(document) = self.cached(&fingerprint) {
            return Ok(document);
        }

        let this = self.clone();
        self.loads
            .run(fingerprint.clone(), move || async move {
                this.decode(fingerprint, data, false).await
            })
            .await
    }

    async fn load(&self, expected: Fingerprint) -> DocumentResult<Arc<SourceDocument>> {
        tracing::info!("Loading source document from {}", self.path.display());

        let data = Bytes::from(tokio::fs::read(self.path.as_ref()).await?);
        self.decode(expected, data, true).await
    }

    async fn decode(
        &self,
        expected: Fingerprint,
        data: Bytes,
        verify: bool,
    ) -> DocumentResult<Arc<SourceDocument>> {
        let started = Instant::now();
        let extractor = Arc::clone(&self.extractor);

        // Hashing and decoding are CPU-bound
        let decode_result = timeout(
            Duration::from_secs(DECODE_TIMEOUT_SECS),
            tokio::task::spawn_blocking(move || {
                if verify {
                    let actual = fingerprint_bytes(&data);
                    if actual != expected {
                        return Err(DocumentError::SourceChanged { expected, actual });
                    }
                }
                let page_count = extractor
                    .page_count(&data)
                    .map_err(|e| DocumentError::Decode(e.to_string()))?;
                Ok(SourceDocument::new(expected, data, page_count))
            }),
        )
        .await;

        let document = match decode_result {
            Ok(join_result) => join_result
                .map_err(|e| DocumentError::Decode(format!("Task join error: {}", e)))??,
            Err(_) => return Err(DocumentError::Timeout(DECODE_TIMEOUT_SECS)),
        };
        let document = Arc::new(document);

        let previous = self.slot.lock().replace(Arc::clone(&document));
        if let Some(previous) = previous {
            tracing::debug!("Released source document {}", previous.fingerprint());
            drop(previous);
        }

        tracing::info!(
            pages = document.page_count(),
            bytes = document.size(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Source document decoded"
        );

        Ok(document)
    }
}
