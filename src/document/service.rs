//! Process-wide document service
//!
//! Owns the startup facts about the source document and the page pipeline.
//! Built once in `main` and shared with request handlers through `AppState`.

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use tokio::task::JoinHandle;

use super::error::{DocumentError, DocumentResult};
use super::fingerprint::{read_document, Fingerprint};
use super::pipeline::{PagePipeline, PipelineConfig, PipelineStats};
use super::traits::PageExtractor;
use super::types::DocumentInfo;

/// Serves pages of one source document
pub struct DocumentService {
    info: DocumentInfo,
    pipeline: PagePipeline,
}

impl DocumentService {
    /// Fingerprint the document and establish its page count
    ///
    /// The file is read once; the same bytes are hashed and then decoded
    /// into the source cache. Fails if the file cannot be read. A document that cannot be decoded
    /// still yields a service, with an unknown page count.
    pub async fn open(
        path: impl AsRef<Path>,
        extractor: Arc<dyn PageExtractor>,
        config: PipelineConfig,
    ) -> DocumentResult<Self> {
        let path = path.as_ref();
        let (mut info, data) = read_document(path).await?;
        let pipeline = PagePipeline::new(path, extractor, config);

        match pipeline.source_cache().seed(info.fingerprint.clone(), data).await {
            Ok(document) => info.page_count = Some(document.page_count()),
            Err(e) => {
                tracing::warn!("Unable to determine page count for {}: {}", path.display(), e);
            }
        }

        tracing::info!(
            "Opened {} ({} bytes, {} pages, fingerprint {})",
            info.file_name,
            info.file_size,
            info.page_count
                .map(|n| n.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            info.fingerprint
        );

        Ok(Self { info, pipeline })
    }

    pub fn info(&self) -> &DocumentInfo {
        &self.info
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.info.fingerprint
    }

    pub fn page_count(&self) -> Option<usize> {
        self.info.page_count
    }

    pub fn content_type(&self) -> &'static str {
        self.pipeline.content_type()
    }

    pub fn pipeline(&self) -> &PagePipeline {
        &self.pipeline
    }

    /// Whether the source file is still present on disk
    pub async fn source_exists(&self) -> bool {
        tokio::fs::try_exists(&self.info.path).await.unwrap_or(false)
    }

    /// Validate a 1-based page index against the known page count
    pub fn check_page(&self, page: usize) -> DocumentResult<()> {
        let in_range = match self.info.page_count {
            Some(count) => (1..=count).contains(&page),
            None => page >= 1,
        };

        if in_range {
            Ok(())
        } else {
            Err(DocumentError::PageOutOfRange {
                page,
                page_count: self.info.page_count,
            })
        }
    }

    /// Artifact for a page of the current document version
    pub async fn page(&self, page: usize) -> DocumentResult<Bytes> {
        self.check_page(page)?;
        self.pipeline
            .derive_or_fetch(&self.info.fingerprint, page)
            .await
    }

    /// Derive page 1 in the background
    ///
    /// Best effort: failures are logged and otherwise ignored. Returns `None`
    /// when the document is known to have no pages.
    pub fn warm_up(&self) -> Option<JoinHandle<()>> {
        if self.info.page_count == Some(0) {
            return None;
        }

        let pipeline = self.pipeline.clone();
        let fingerprint = self.info.fingerprint.clone();
        Some(tokio::spawn(async move {
            match pipeline.derive_or_fetch(&fingerprint, 1).await {
                Ok(artifact) => {
                    tracing::info!("Warmed page 1 ({} bytes)", artifact.len());
                }
                Err(e) => {
                    tracing::warn!("Warm-up of page 1 failed: {}", e);
                }
            }
        }))
    }

    pub fn stats(&self) -> PipelineStats {
        self.pipeline.stats()
    }

    /// Release cached artifacts and the decoded source
    pub fn shutdown(&self) {
        tracing::info!("Releasing document caches...");
        self.pipeline.clear();
    }
}
