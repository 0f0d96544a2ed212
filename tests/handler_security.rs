mod common;

use axum::http::{HeaderName, HeaderValue, Method, StatusCode};

fn header(name: &'static str, value: &'static str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static(name),
        HeaderValue::from_static(value),
    )
}

#[tokio::test]
async fn test_security_headers_on_every_response() {
    let app = common::create_test_app();

    for path in ["/live", "/nosuch"] {
        let response = app.server.get(path).await;

        assert_eq!(response.header("x-content-type-options"), "nosniff", "{path}");
        assert_eq!(response.header("x-frame-options"), "DENY", "{path}");
        assert_eq!(response.header("x-xss-protection"), "1; mode=block", "{path}");
        assert_eq!(
            response.header("referrer-policy"),
            "strict-origin-when-cross-origin",
            "{path}"
        );
        assert_eq!(
            response.header("content-security-policy"),
            "default-src 'none'; frame-ancestors 'none'",
            "{path}"
        );
        assert_eq!(
            response.header("permissions-policy"),
            "geolocation=(), microphone=(), camera=()",
            "{path}"
        );
        assert_eq!(
            response.header("cache-control"),
            "no-store, no-cache, must-revalidate",
            "{path}"
        );
        assert_eq!(response.header("pragma"), "no-cache", "{path}");
    }
}

#[tokio::test]
async fn test_redirect_not_cacheable() {
    let app = common::create_test_app();
    app.seed_link("abc123", "https://example.com/x", None);

    let response = app.server.get("/abc123").await;

    response.assert_status(StatusCode::FOUND);
    assert_eq!(
        response.header("cache-control"),
        "no-store, no-cache, must-revalidate"
    );
}

#[tokio::test]
async fn test_preflight_allows_api_key_header() {
    let app = common::create_test_app();
    let (origin_name, origin) = header("origin", "https://dashboard.example.com");
    let (method_name, method) = header("access-control-request-method", "POST");
    let (headers_name, requested) = header("access-control-request-headers", "x-api-key");

    let response = app
        .server
        .method(Method::OPTIONS, "/api/shorten")
        .add_header(origin_name, origin)
        .add_header(method_name, method)
        .add_header(headers_name, requested)
        .await;

    response.assert_status(StatusCode::NO_CONTENT);
    assert_eq!(response.header("access-control-allow-origin"), "*");
    assert_eq!(response.header("access-control-max-age"), "86400");

    let allowed = response.header("access-control-allow-headers");
    let allowed = allowed.to_str().unwrap().to_ascii_lowercase();
    assert!(allowed.contains("x-api-key"), "allowed: {allowed}");
    assert!(allowed.contains("authorization"), "allowed: {allowed}");

    let methods = response.header("access-control-allow-methods");
    let methods = methods.to_str().unwrap();
    assert!(methods.contains("POST") && methods.contains("DELETE"), "methods: {methods}");
}

#[tokio::test]
async fn test_preflight_needs_no_key_and_is_not_counted() {
    let app = common::create_test_app_with_budget(1);
    let (origin_name, origin) = header("origin", "https://dashboard.example.com");
    let (method_name, method) = header("access-control-request-method", "DELETE");

    for _ in 0..3 {
        let response = app
            .server
            .method(Method::OPTIONS, "/api/abc123")
            .add_header(origin_name.clone(), origin.clone())
            .add_header(method_name.clone(), method.clone())
            .await;

        response.assert_status(StatusCode::NO_CONTENT);
    }
}

#[tokio::test]
async fn test_cors_origin_on_simple_request() {
    let app = common::create_test_app();
    let (origin_name, origin) = header("origin", "https://dashboard.example.com");

    let response = app.server.get("/live").add_header(origin_name, origin).await;

    response.assert_status_ok();
    assert_eq!(response.header("access-control-allow-origin"), "*");
}
