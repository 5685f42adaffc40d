//! Single byte-range parsing for the `Range` request header

/// Inclusive byte range within a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Parse `bytes=a-b`, `bytes=a-` or `bytes=-n` against `file_size`
    ///
    /// Returns `None` for anything malformed or unsatisfiable, including
    /// multi-range requests and an end past the last byte; callers then
    /// serve the whole file.
    pub fn parse(header: &str, file_size: u64) -> Option<Self> {
        let spec = header.strip_prefix("bytes=")?;
        let (start, end) = spec.split_once('-')?;
        let start = parse_bound(start)?;
        let end = parse_bound(end)?;

        let (start, end) = match (start, end) {
            (None, None) => return None,
            (None, Some(suffix)) => {
                if suffix == 0 || file_size == 0 {
                    return None;
                }
                (file_size.saturating_sub(suffix), file_size - 1)
            }
            (Some(start), None) => (start, file_size.checked_sub(1)?),
            (Some(start), Some(end)) => (start, end),
        };

        if start > end || end >= file_size {
            return None;
        }

        Some(Self { start, end })
    }

    /// Number of bytes covered; never zero
    pub fn length(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Value for the `Content-Range` response header
    pub fn content_range(&self, file_size: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, file_size)
    }
}

/// `Some(None)` for an empty bound, `None` if it is not all digits
fn parse_bound(value: &str) -> Option<Option<u64>> {
    if value.is_empty() {
        return Some(None);
    }
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok().map(Some)
}
