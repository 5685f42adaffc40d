//! Document API endpoints
//!
//! - `GET /info`: document metadata
//! - `GET /page/:n`: page `n` as a standalone PDF
//! - `GET /stream`: the whole file, with byte-range support

use std::io::SeekFrom;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use crate::document::DocumentInfo;
use crate::error::{AppError, Result};
use crate::headers::{http_date, if_none_match, not_modified_since};
use crate::range::ByteRange;
use crate::state::AppState;

/// Create the document router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/info", get(get_info))
        .route("/page/:n", get(get_page))
        .route("/stream", get(stream_document))
}

/// Get document metadata
async fn get_info(State(state): State<AppState>) -> Result<Json<DocumentInfo>> {
    let document = state.document();
    if !document.source_exists().await {
        return Err(AppError::NotFound(document.info().file_name.clone()));
    }

    Ok(Json(document.info().clone()))
}

/// Get a single page as a standalone document
async fn get_page(
    State(state): State<AppState>,
    Path(n): Path<String>,
    headers: HeaderMap,
) -> Result<Response> {
    let document = state.document();
    if !document.source_exists().await {
        return Err(AppError::NotFound(document.info().file_name.clone()));
    }

    let page: usize = n
        .parse()
        .map_err(|_| AppError::invalid_page(&n, document.page_count()))?;
    document.check_page(page)?;

    let info = document.info();
    let etag = info.fingerprint.page_etag(page);
    let validators = [
        (header::ETAG, etag.clone()),
        (header::LAST_MODIFIED, http_date(&info.last_modified)),
        (
            header::CACHE_CONTROL,
            state.config().http.environment.page_cache_control().to_string(),
        ),
    ];

    let client_has_page = header_str(&headers, header::IF_NONE_MATCH)
        .map(|value| if_none_match(value, &etag))
        .unwrap_or(false);
    if client_has_page {
        tracing::debug!(page, "Page not modified");
        return Ok(with_headers(StatusCode::NOT_MODIFIED, &validators, Body::empty()));
    }

    let artifact = document.page(page).await?;
    let length = artifact.len().to_string();

    let mut response = with_headers(StatusCode::OK, &validators, Body::from(artifact));
    insert(response.headers_mut(), header::CONTENT_TYPE, document.content_type());
    insert(response.headers_mut(), header::CONTENT_LENGTH, &length);

    Ok(response)
}

/// Stream the whole source file, honoring a single byte range
async fn stream_document(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    let document = state.document();
    let info = document.info();

    let metadata = match tokio::fs::metadata(&info.path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound(info.file_name.clone()));
        }
        Err(e) => return Err(e.into()),
    };
    let file_size = metadata.len();

    let etag = info.fingerprint.weak_etag();
    let validators = [
        (header::ACCEPT_RANGES, "bytes".to_string()),
        (header::CONTENT_TYPE, document.content_type().to_string()),
        (header::ETAG, etag.clone()),
        (header::LAST_MODIFIED, http_date(&info.last_modified)),
        (
            header::CACHE_CONTROL,
            state.config().http.environment.stream_cache_control().to_string(),
        ),
    ];

    let etag_matches = header_str(&headers, header::IF_NONE_MATCH)
        .map(|value| if_none_match(value, &etag))
        .unwrap_or(false);
    let unmodified = header_str(&headers, header::IF_MODIFIED_SINCE)
        .map(|value| not_modified_since(value, &info.last_modified))
        .unwrap_or(false);
    if etag_matches || unmodified {
        return Ok(with_headers(StatusCode::NOT_MODIFIED, &validators, Body::empty()));
    }

    let mut file = tokio::fs::File::open(&info.path).await?;
    let range = header_str(&headers, header::RANGE).and_then(|value| ByteRange::parse(value, file_size));

    let response = match range {
        Some(range) => {
            tracing::debug!(start = range.start, end = range.end, "Serving partial content");
            file.seek(SeekFrom::Start(range.start)).await?;
            let body = Body::from_stream(ReaderStream::new(file.take(range.length())));

            let mut response = with_headers(StatusCode::PARTIAL_CONTENT, &validators, body);
            insert(
                response.headers_mut(),
                header::CONTENT_RANGE,
                &range.content_range(file_size),
            );
            insert(response.headers_mut(), header::CONTENT_LENGTH, &range.length().to_string());
            response
        }
        None => {
            let body = Body::from_stream(ReaderStream::new(file));
            let mut response = with_headers(StatusCode::OK, &validators, body);
            insert(response.headers_mut(), header::CONTENT_LENGTH, &file_size.to_string());
            response
        }
    };

    Ok(response)
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Option<&str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

fn with_headers(status: StatusCode, headers: &[(header::HeaderName, String)], body: Body) -> Response {
    let mut response = (status, body).into_response();
    for (name, value) in headers {
        insert(response.headers_mut(), name.clone(), value);
    }
    response
}

fn insert(headers: &mut HeaderMap, name: header::HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(_) => tracing::warn!("Dropping invalid {} header value {:?}", name, value),
    }
}
