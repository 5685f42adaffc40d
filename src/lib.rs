//! pdf-pager library
//!
//! Everything the server binary is built from, exposed for integration tests
//! and benchmarks.
//!
//! # Modules
//!
//! - `document`: page derivation cache (fingerprints, source cache, page LRU, coalescing)
//! - `formats`: MuPDF page extractor
//! - `routes`: axum routers for the document API and health checks
//! - `config`, `error`, `state`: server plumbing
//! - `headers`, `range`: conditional and range request helpers

pub mod config;
pub mod document;
pub mod error;
pub mod formats;
pub mod headers;
pub mod range;
pub mod routes;
pub mod state;
