//! Content fingerprints for the source document
//!
//! A fingerprint is the SHA-256 digest of the full file contents. It does not
//! depend on file system metadata, so identical bytes always produce the same
//! fingerprint. The service computes it once at startup.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};
use tokio::io::AsyncReadExt;

use super::error::{DocumentError, DocumentResult};
use super::types::DocumentInfo;

/// Read buffer size used while hashing
const READ_CHUNK_SIZE: usize = 64 * 1024;

/// Content-derived identity of a document version
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(Arc<str>);

impl Fingerprint {
    /// Build a fingerprint from a finished digest
    pub fn from_digest(digest: &[u8]) -> Self {
        Self(hex::encode(digest).into())
    }

    /// Lower-case hex digest
    pub fn as_hex(&self) -> &str {
        &self.0
    }

    /// Weak validator for the whole document, e.g. `W/"9f86d0..."`
    pub fn weak_etag(&self) -> String {
        format!("W/\"{}\"", self.0)
    }

    /// Validator for a single derived page, e.g. `"9f86d0...-p3"`
    pub fn page_etag(&self, page: usize) -> String {
        format!("\"{}-p{}\"", self.0, page)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "W/\"{}\"", self.0)
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.weak_etag())
    }
}

/// Fingerprint of an in-memory buffer
pub fn fingerprint_bytes(data: &[u8]) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(data);
    Fingerprint::from_digest(&hasher.finalize())
}

/// Stream a file through SHA-256
pub async fn compute_fingerprint(path: impl AsRef<Path>) -> DocumentResult<Fingerprint> {
    let mut file = tokio::fs::File::open(path.as_ref()).await?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; READ_CHUNK_SIZE];

    loop {
        let read = file.read(&mut buffer).await?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(Fingerprint::from_digest(&hasher.finalize()))
}

/// Stat, read and fingerprint the source document in one pass
///
/// Returns the contents with the info so the caller can decode them without
/// reading or hashing the file a second time. The page count is left unset.
pub async fn read_document(path: impl AsRef<Path>) -> DocumentResult<(DocumentInfo, Bytes)> {
    let path = path.as_ref();
    let metadata = tokio::fs::metadata(path).await?;
    let modified: DateTime<Utc> = metadata.modified()?.into();
    let data = Bytes::from(tokio::fs::read(path).await?);

    // Hashing a large document is CPU-bound
    let hashed = data.clone();
    let fingerprint = tokio::task::spawn_blocking(move || fingerprint_bytes(&hashed))
        .await
        .map_err(|e| DocumentError::Decode(format!("Task join error: {}", e)))?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    tracing::debug!("Fingerprinted {} as {}", path.display(), fingerprint);

    let info = DocumentInfo {
        path: path.to_path_buf(),
        file_name,
        file_size: data.len() as u64,
        last_modified: modified,
        fingerprint,
        page_count: None,
    };
    Ok((info, data))
}
