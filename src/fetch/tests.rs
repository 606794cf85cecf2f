//! Tests for the HTTP transport module

use super::*;
use crate::collector::{Collector, PageFetcher, StoppingPolicy};
use crate::decode::JsonPageDecoder;
use crate::error::Error;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn decoder() -> Box<JsonPageDecoder> {
    Box::new(
        JsonPageDecoder::new()
            .with_record_path("items")
            .with_has_more_path("more"),
    )
}

#[test]
fn test_client_config_builder() {
    let config = HttpClientConfig::builder()
        .base_url("https://api.example.com")
        .timeout(Duration::from_secs(60))
        .header("X-Custom", "value")
        .user_agent("test-agent/1.0")
        .no_rate_limit()
        .build();

    assert_eq!(config.base_url, Some("https://api.example.com".to_string()));
    assert_eq!(config.timeout, Duration::from_secs(60));
    assert_eq!(
        config.default_headers.get("X-Custom"),
        Some(&"value".to_string())
    );
    assert_eq!(config.user_agent, "test-agent/1.0");
    assert!(config.rate_limit.is_none());
}

#[test]
fn test_request_config_builder() {
    let config = RequestConfig::new()
        .query("page", "1")
        .query("per_page", "100")
        .header("X-Api-Key", "secret")
        .timeout(Duration::from_secs(10));

    assert_eq!(config.query.get("page"), Some(&"1".to_string()));
    assert_eq!(config.query.get("per_page"), Some(&"100".to_string()));
    assert_eq!(config.headers.get("X-Api-Key"), Some(&"secret".to_string()));
    assert_eq!(config.timeout, Some(Duration::from_secs(10)));
}

#[tokio::test]
async fn test_client_get_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/listing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": 1, "name": "Alice"}]
        })))
        .mount(&mock_server)
        .await;

    let client = HttpClient::new();
    let body: serde_json::Value = client
        .get_json(&format!("{}/api/listing", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(body["items"][0]["name"], "Alice");
}

#[tokio::test]
async fn test_client_base_url_join() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/employers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url(format!("{}/v1/", mock_server.uri()))
        .build();
    let client = HttpClient::with_config(config);

    let body: serde_json::Value = client.get_json("employers").await.unwrap();
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn test_client_default_headers_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/protected"))
        .and(header("X-API-KEY", "token-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .header("X-API-KEY", "token-123")
        .build();
    let client = HttpClient::with_config(config);

    let body: serde_json::Value = client
        .get_json(&format!("{}/api/protected", mock_server.uri()))
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_client_non_2xx_is_error_with_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such listing"))
        .mount(&mock_server)
        .await;

    let client = HttpClient::new();
    let err = client
        .get(&format!("{}/api/gone", mock_server.uri()))
        .await
        .unwrap_err();

    match err {
        Error::HttpStatus { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, "no such listing");
        }
        other => panic!("expected HttpStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn test_http_source_injects_page_param() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/vacancies"))
        .and(query_param("page", "3"))
        .and(query_param("keyword", "analyst"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": 7}],
            "more": false
        })))
        .mount(&mock_server)
        .await;

    let mut source = HttpSource::new(
        HttpClient::new(),
        format!("{}/api/vacancies", mock_server.uri()),
        decoder(),
    )
    .with_param("keyword", "analyst");

    let page = source.fetch_page(3).await.unwrap();

    assert_eq!(page.len(), 1);
    assert_eq!(page.meta.has_more, Some(false));
}

#[tokio::test]
async fn test_http_source_custom_page_param_and_per_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/movies"))
        .and(query_param("p", "1"))
        .and(query_param("limit", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"title": "Comedy"}],
            "more": true
        })))
        .mount(&mock_server)
        .await;

    let mut source = HttpSource::new(
        HttpClient::new(),
        format!("{}/api/movies", mock_server.uri()),
        decoder(),
    )
    .with_page_param("p")
    .with_per_page("limit", 100);

    let page = source.fetch_page(1).await.unwrap();
    assert_eq!(page.len(), 1);
}

#[tokio::test]
async fn test_http_source_filter_preserves_raw_count() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/groups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"title": "Flowers Omsk"},
                {"title": "Flowers Tomsk"},
                {"title": "Flowers Omsk Central"}
            ],
            "more": false
        })))
        .mount(&mock_server)
        .await;

    let mut source = HttpSource::new(
        HttpClient::new(),
        format!("{}/api/groups", mock_server.uri()),
        decoder(),
    )
    .with_item_filter(|item| {
        item["title"]
            .as_str()
            .is_some_and(|t| t.contains("Omsk"))
    });

    let page = source.fetch_page(0).await.unwrap();

    assert_eq!(page.len(), 2);
    assert_eq!(page.raw_count, 3);
}

#[tokio::test]
async fn test_collect_over_http_source() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/chars"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"n": 1}, {"n": 2}],
            "more": true
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/chars"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"n": 3}],
            "more": false
        })))
        .mount(&mock_server)
        .await;

    let mut source = HttpSource::new(
        HttpClient::new(),
        format!("{}/api/chars", mock_server.uri()),
        decoder(),
    );

    let outcome = Collector::new(StoppingPolicy::ExplicitFlag)
        .with_origin(1)
        .collect(&mut source)
        .await;

    assert!(outcome.is_complete());
    assert!(outcome.exhausted);
    assert_eq!(outcome.items.len(), 3);
    assert_eq!(outcome.stats.pages_fetched, 2);
}

#[tokio::test]
async fn test_collect_surfaces_server_error_with_partial_items() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/chars"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"n": 1}, {"n": 2}],
            "more": true
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/chars"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let mut source = HttpSource::new(
        HttpClient::new(),
        format!("{}/api/chars", mock_server.uri()),
        decoder(),
    );

    let outcome = Collector::new(StoppingPolicy::ExplicitFlag)
        .with_origin(1)
        .collect(&mut source)
        .await;

    assert_eq!(outcome.items.len(), 2);
    assert!(matches!(
        outcome.error,
        Some(Error::HttpStatus { status: 500, .. })
    ));
}
