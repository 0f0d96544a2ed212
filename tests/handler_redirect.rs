mod common;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use shortlink_engine::prelude::{CacheService, LinkRepository};

#[tokio::test]
async fn test_redirect_success() {
    let app = common::create_test_app();
    app.seed_link("abc123", "https://example.com/target", None);

    let response = app.server.get("/abc123").await;

    response.assert_status(StatusCode::FOUND);
    assert_eq!(response.header("location"), "https://example.com/target");
}

#[tokio::test]
async fn test_redirect_not_found() {
    let app = common::create_test_app();

    let response = app.server.get("/nothere").await;

    response.assert_status_not_found();
    assert_eq!(response.json::<Value>()["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_redirect_implausible_code_is_not_found() {
    let app = common::create_test_app();

    let response = app.server.get("/thiscodeiswaytoolongtobereal").await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn test_redirect_expired_link() {
    let app = common::create_test_app();
    app.seed_link(
        "old123",
        "https://example.com/gone",
        Some(Utc::now() - Duration::hours(1)),
    );

    let response = app.server.get("/old123").await;

    response.assert_status(StatusCode::GONE);
    assert_eq!(response.json::<Value>()["error"]["code"], "expired");
}

#[tokio::test]
async fn test_redirect_counts_clicks() {
    let app = common::create_test_app();
    app.seed_link("clicky", "https://example.com", None);

    for _ in 0..3 {
        app.server.get("/clicky").await.assert_status(StatusCode::FOUND);
    }
    app.settle().await;

    assert_eq!(app.links.get("clicky").unwrap().clicks, 3);
}

#[tokio::test]
async fn test_redirect_populates_cache() {
    let app = common::create_test_app();
    app.seed_link("cached1", "https://example.com/cached", None);

    app.server.get("/cached1").await.assert_status(StatusCode::FOUND);
    app.settle().await;

    let cached = app.cache.get_link("cached1").await.unwrap().unwrap();
    assert_eq!(cached.original_url, "https://example.com/cached");
}

#[tokio::test]
async fn test_redirect_served_from_cache() {
    let app = common::create_test_app();
    app.seed_link("cached2", "https://example.com/cached", None);

    app.server.get("/cached2").await.assert_status(StatusCode::FOUND);
    app.settle().await;

    // Gone from the store; the cache still answers.
    app.links.delete("cached2").await.unwrap();

    let response = app.server.get("/cached2").await;

    response.assert_status(StatusCode::FOUND);
    assert_eq!(response.header("location"), "https://example.com/cached");
}

#[tokio::test]
async fn test_shorten_then_redirect_then_delete() {
    let app = common::create_test_app();
    let (raw, _) = app.seed_key("ci", 100).await;
    let header = || {
        (
            HeaderName::from_static("x-api-key"),
            HeaderValue::from_str(&raw).unwrap(),
        )
    };

    let (name, value) = header();
    let response = app
        .server
        .post("/api/shorten")
        .add_header(name, value)
        .json(&json!({ "url": "https://www.rust-lang.org/learn" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let code = response.json::<Value>()["short_code"]
        .as_str()
        .unwrap()
        .to_string();
    app.settle().await;

    let response = app.server.get(&format!("/{code}")).await;
    response.assert_status(StatusCode::FOUND);
    assert_eq!(response.header("location"), "https://www.rust-lang.org/learn");
    app.settle().await;

    let (name, value) = header();
    app.server
        .delete(&format!("/api/{code}"))
        .add_header(name, value)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    app.server
        .get(&format!("/{code}"))
        .await
        .assert_status_not_found();
}
