//! Format-specific page extractors
//!
//! Implementations of [`PageExtractor`](crate::document::PageExtractor) on top
//! of the MuPDF bindings.

pub mod pdf;

pub use pdf::MupdfExtractor;
