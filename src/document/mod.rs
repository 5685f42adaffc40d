//! Page artifact derivation
//!
//! Serves single pages of one large, immutable source document. Derived pages
//! are cached, concurrent requests for the same page are coalesced, and every
//! cache key carries the content fingerprint of the source.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                   DocumentService                       │
//! │      (startup info, page range checks, warm-up)         │
//! └─────────────────────────────────────────────────────────┘
//!                            │
//!                            ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │                    PagePipeline                         │
//! │   PageCache (LRU)  ·  Coalescer<PageKey, Bytes>         │
//! └─────────────────────────────────────────────────────────┘
//!                            │ miss
//!                            ▼
//! ┌──────────────────────────┐   ┌──────────────────────────┐
//! │       SourceCache        │──►│      PageExtractor       │
//! │ (one decoded document,   │   │  (MuPDF, blocking pool)  │
//! │  single-flight loads)    │   │                          │
//! └──────────────────────────┘   └──────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use pdf_pager::document::{DocumentService, PipelineConfig};
//! use pdf_pager::formats::MupdfExtractor;
//!
//! let service = DocumentService::open(path, Arc::new(MupdfExtractor::new()), PipelineConfig::default()).await?;
//! service.warm_up();
//!
//! let artifact = service.page(3).await?;
//! ```

mod cache;
mod coalesce;
mod error;
mod fingerprint;
mod pipeline;
mod service;
mod source;
mod traits;
mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::{PageCache, DEFAULT_PAGE_CACHE_CAPACITY};
pub use coalesce::Coalescer;
pub use error::{DocumentError, DocumentResult};
pub use fingerprint::{compute_fingerprint, fingerprint_bytes, read_document, Fingerprint};
pub use pipeline::{PagePipeline, PipelineConfig, PipelineStats, DEFAULT_DERIVE_TIMEOUT_SECS};
pub use service::DocumentService;
pub use source::SourceCache;
pub use traits::{ExtractError, PageExtractor};
pub use types::{DocumentInfo, PageKey, SourceDocument};
