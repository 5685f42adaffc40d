mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
};
use axum_test::TestServer;
use serde_json::Value;
use tower::ServiceExt;

use common::{spawn_app, TestApp, SOURCE};
use pdf_pager::config::Environment;

async fn get(app: &TestApp, uri: &str, headers: &[(header::HeaderName, &str)]) -> Response {
    let mut request = Request::builder().uri(uri);
    for (name, value) in headers {
        request = request.header(name.clone(), *value);
    }
    app.router
        .clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

fn header_value<'a>(response: &'a Response, name: header::HeaderName) -> &'a str {
    response.headers().get(name).unwrap().to_str().unwrap()
}

#[tokio::test]
async fn test_info_describes_document() {
    let app = spawn_app(Environment::Development).await;
    let server = TestServer::new(app.router.clone()).unwrap();

    let response = server.get("/document/info").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["fileSize"], SOURCE.len() as u64);
    assert_eq!(body["pageCount"], 10);
    assert!(body["lastModified"].is_i64());
    let fingerprint = body["fingerprint"].as_str().unwrap();
    assert!(fingerprint.starts_with("W/\""));
    assert_eq!(fingerprint, app.state.document().fingerprint().weak_etag());
}

#[tokio::test]
async fn test_compatibility_mount_serves_same_api() {
    let app = spawn_app(Environment::Development).await;
    let server = TestServer::new(app.router.clone()).unwrap();

    server.get("/api/pdf/info").await.assert_status_ok();
    server.get("/api/pdf/page/2").await.assert_status_ok();
}

#[tokio::test]
async fn test_page_is_derived_once() {
    let app = spawn_app(Environment::Development).await;

    let first = get(&app, "/document/page/1", &[]).await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(header_value(&first, header::CONTENT_TYPE), "application/pdf");
    assert_eq!(header_value(&first, header::CACHE_CONTROL), "no-cache");
    let etag = header_value(&first, header::ETAG).to_string();
    assert_eq!(etag, app.state.document().fingerprint().page_etag(1));
    assert!(first.headers().contains_key(header::LAST_MODIFIED));
    let first_body = body_bytes(first).await;

    let second = get(&app, "/document/page/1", &[]).await;
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(body_bytes(second).await, first_body);

    assert_eq!(first_body, b"%PDF-1.7 page 1");
    assert_eq!(app.extractor.extractions(), 1);
}

#[tokio::test]
async fn test_invalid_pages_are_bad_requests() {
    let app = spawn_app(Environment::Development).await;

    for uri in ["/document/page/0", "/document/page/11", "/document/page/abc", "/document/page/1.5"] {
        let response = get(&app, uri, &[]).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);

        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body["error"], "Invalid page number");
        assert_eq!(body["totalPages"], 10);
    }
    assert_eq!(app.extractor.extractions(), 0);
}

#[tokio::test]
async fn test_matching_etag_is_not_modified() {
    let app = spawn_app(Environment::Development).await;
    let etag = app.state.document().fingerprint().page_etag(5);

    let response = get(&app, "/document/page/5", &[(header::IF_NONE_MATCH, etag.as_str())]).await;

    assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
    assert_eq!(header_value(&response, header::ETAG), etag);
    assert!(body_bytes(response).await.is_empty());
    assert_eq!(app.extractor.extractions(), 0);
}

#[tokio::test]
async fn test_stale_etag_gets_full_page() {
    let app = spawn_app(Environment::Development).await;
    let other = app.state.document().fingerprint().page_etag(4);

    let response = get(&app, "/document/page/5", &[(header::IF_NONE_MATCH, other.as_str())]).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"%PDF-1.7 page 5");
}

#[tokio::test]
async fn test_production_pages_are_immutable() {
    let app = spawn_app(Environment::Production).await;

    let response = get(&app, "/document/page/2", &[]).await;

    assert_eq!(
        header_value(&response, header::CACHE_CONTROL),
        "public, max-age=31536000, immutable"
    );
}

#[tokio::test]
async fn test_extraction_failure_is_internal_error_and_retried() {
    let app = spawn_app(Environment::Development).await;
    app.extractor.fail_next(1);

    let failed = get(&app, "/document/page/3", &[]).await;
    assert_eq!(failed.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_slice(&body_bytes(failed).await).unwrap();
    assert_eq!(body["error"], "Failed to extract page");

    let retried = get(&app, "/document/page/3", &[]).await;
    assert_eq!(retried.status(), StatusCode::OK);
    assert_eq!(app.extractor.extractions(), 2);
}

#[tokio::test]
async fn test_missing_source_is_not_found() {
    let app = spawn_app(Environment::Development).await;
    std::fs::remove_file(app.source.path()).unwrap();

    for uri in ["/document/info", "/document/page/1", "/document/stream"] {
        let response = get(&app, uri, &[]).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);

        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body["error"], "PDF not found");
    }
}

#[tokio::test]
async fn test_stream_serves_whole_file() {
    let app = spawn_app(Environment::Development).await;

    let response = get(&app, "/document/stream", &[]).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_value(&response, header::ACCEPT_RANGES), "bytes");
    assert_eq!(header_value(&response, header::CACHE_CONTROL), "no-store");
    assert_eq!(
        header_value(&response, header::CONTENT_LENGTH),
        SOURCE.len().to_string()
    );
    assert_eq!(body_bytes(response).await, SOURCE);
}

#[tokio::test]
async fn test_stream_serves_partial_content() {
    let app = spawn_app(Environment::Development).await;

    let response = get(&app, "/document/stream", &[(header::RANGE, "bytes=0-7")]).await;

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(
        header_value(&response, header::CONTENT_RANGE),
        format!("bytes 0-7/{}", SOURCE.len())
    );
    assert_eq!(body_bytes(response).await, &SOURCE[..8]);

    let suffix = get(&app, "/document/stream", &[(header::RANGE, "bytes=-6")]).await;
    assert_eq!(suffix.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(body_bytes(suffix).await, &SOURCE[SOURCE.len() - 6..]);
}

#[tokio::test]
async fn test_unsatisfiable_range_falls_back_to_full_body() {
    let app = spawn_app(Environment::Development).await;

    let response = get(&app, "/document/stream", &[(header::RANGE, "bytes=5000-6000")]).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, SOURCE);
}

#[tokio::test]
async fn test_stream_conditional_requests() {
    let app = spawn_app(Environment::Development).await;
    let etag = app.state.document().fingerprint().weak_etag();

    let by_etag = get(&app, "/document/stream", &[(header::IF_NONE_MATCH, etag.as_str())]).await;
    assert_eq!(by_etag.status(), StatusCode::NOT_MODIFIED);

    let by_date = get(
        &app,
        "/document/stream",
        &[(header::IF_MODIFIED_SINCE, "Fri, 31 Dec 9999 23:59:59 GMT")],
    )
    .await;
    assert_eq!(by_date.status(), StatusCode::NOT_MODIFIED);

    let old_date = get(
        &app,
        "/document/stream",
        &[(header::IF_MODIFIED_SINCE, "Thu, 01 Jan 1970 00:00:00 GMT")],
    )
    .await;
    assert_eq!(old_date.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app(Environment::Development).await;
    let server = TestServer::new(app.router.clone()).unwrap();

    for path in ["/healthz", "/health"] {
        let response = server.get(path).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "healthy");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_page_requests_share_one_derivation() {
    let app = spawn_app(Environment::Development).await;

    let requests = (0..50).map(|_| get(&app, "/document/page/3", &[]));
    let responses = futures::future::join_all(requests).await;

    for response in responses {
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, b"%PDF-1.7 page 3");
    }
    assert_eq!(app.extractor.extractions(), 1);
}

#[tokio::test]
async fn test_responses_carry_security_headers() {
    let app = spawn_app(Environment::Development).await;

    for uri in ["/document/page/1", "/document/page/0", "/healthz"] {
        let response = get(&app, uri, &[]).await;
        assert_eq!(header_value(&response, header::X_CONTENT_TYPE_OPTIONS), "nosniff", "{}", uri);
        assert_eq!(header_value(&response, header::X_FRAME_OPTIONS), "SAMEORIGIN", "{}", uri);
        assert_eq!(header_value(&response, header::REFERRER_POLICY), "no-referrer", "{}", uri);
    }
}
