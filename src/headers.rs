//! Conditional request helpers

use chrono::{DateTime, TimeZone, Utc};

const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Whether an `If-None-Match` header value matches `etag`
///
/// Uses weak comparison: `W/"x"` matches `"x"`. Accepts `*` and
/// comma-separated lists.
pub fn if_none_match(header: &str, etag: &str) -> bool {
    let wanted = strip_weak(etag.trim());
    header.split(',').map(str::trim).any(|candidate| {
        candidate == "*" || (!candidate.is_empty() && strip_weak(candidate) == wanted)
    })
}

fn strip_weak(tag: &str) -> &str {
    tag.strip_prefix("W/").unwrap_or(tag)
}

/// Format a timestamp as an HTTP date (IMF-fixdate)
pub fn http_date(time: &DateTime<Utc>) -> String {
    time.format(HTTP_DATE_FORMAT).to_string()
}

/// Parse an HTTP date, accepting IMF-fixdate and RFC 2822 variants
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    DateTime::parse_from_rfc2822(value)
        .map(|t| t.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            chrono::NaiveDateTime::parse_from_str(value, HTTP_DATE_FORMAT)
                .ok()
                .map(|t| Utc.from_utc_datetime(&t))
        })
}

/// Whether a resource modified at `last_modified` is unchanged since `header`
///
/// HTTP dates have second precision, so sub-second parts are ignored.
pub fn not_modified_since(header: &str, last_modified: &DateTime<Utc>) -> bool {
    parse_http_date(header)
        .map(|since| last_modified.timestamp() <= since.timestamp())
        .unwrap_or(false)
}
