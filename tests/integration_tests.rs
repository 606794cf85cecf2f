//! Integration tests using a mock HTTP server
//!
//! Drives the full flow: paged API → collector → flat file.

use pagewalk::collector::{Collector, StoppingPolicy};
use pagewalk::config::{load_definition_from_str, SourceKind};
use pagewalk::decode::JsonPageDecoder;
use pagewalk::error::Error;
use pagewalk::fetch::{HttpClient, HttpClientConfig, HttpSource};
use pagewalk::sink::{CsvSink, JsonSink, Sink};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Bounded-pages API flow
// ============================================================================

#[tokio::test]
async fn test_bounded_pages_api_to_csv() {
    let mock_server = MockServer::start().await;

    for page in 1..=3u32 {
        Mock::given(method("GET"))
            .and(path("/employers"))
            .and(query_param("page", page.to_string()))
            .and(query_param("area", "1217"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {"id": page * 10, "name": format!("Employer {page}a"), "open_vacancies": 4},
                    {"id": page * 10 + 1, "name": format!("Employer {page}b"), "open_vacancies": 1}
                ],
                "pages": 3,
                "page": page
            })))
            .mount(&mock_server)
            .await;
    }

    let decoder = JsonPageDecoder::new()
        .with_record_path("items")
        .with_total_pages_path("pages");
    let mut source = HttpSource::new(
        HttpClient::new(),
        format!("{}/employers", mock_server.uri()),
        Box::new(decoder),
    )
    .with_param("area", "1217");

    let outcome = Collector::new(StoppingPolicy::BoundedPages)
        .with_origin(1)
        .collect(&mut source)
        .await;

    assert!(outcome.is_complete());
    assert!(outcome.exhausted);
    assert_eq!(outcome.stats.pages_fetched, 3);
    assert_eq!(outcome.items.len(), 6);

    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("employers.csv");
    let mut sink = CsvSink::new(
        &csv_path,
        vec!["id".to_string(), "name".to_string(), "open_vacancies".to_string()],
    );
    sink.write(&outcome.items).unwrap();

    let written = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(written.lines().count(), 7); // header + 6 rows
    assert!(written.lines().nth(1).unwrap().contains("Employer 1a"));
    assert!(written.lines().last().unwrap().contains("Employer 3b"));
}

// ============================================================================
// Explicit-flag API flow
// ============================================================================

#[tokio::test]
async fn test_explicit_flag_api_with_auth_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/vacancies"))
        .and(query_param("page", "0"))
        .and(header("X-Api-App-Id", "app-key-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "objects": [{"profession": "Analyst"}, {"profession": "Engineer"}],
            "more": true
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/vacancies"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "objects": [{"profession": "Scientist"}],
            "more": false
        })))
        .mount(&mock_server)
        .await;

    let decoder = JsonPageDecoder::new()
        .with_record_path("objects")
        .with_has_more_path("more");
    let mut source = HttpSource::new(
        HttpClient::new(),
        format!("{}/vacancies", mock_server.uri()),
        Box::new(decoder),
    )
    .with_header("X-Api-App-Id", "app-key-1");

    let outcome = Collector::new(StoppingPolicy::ExplicitFlag)
        .with_origin(0)
        .collect(&mut source)
        .await;

    assert!(outcome.exhausted);
    assert_eq!(outcome.items.len(), 3);
    assert_eq!(outcome.items[2]["profession"], "Scientist");
}

// ============================================================================
// Cursor API flow
// ============================================================================

#[tokio::test]
async fn test_cursor_api_stops_on_null_next() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/character"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "info": {"next": format!("{}/character?page=2", mock_server.uri())},
            "results": [{"name": "Rick"}, {"name": "Morty"}]
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/character"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "info": {"next": null},
            "results": [{"name": "Summer"}]
        })))
        .mount(&mock_server)
        .await;

    let decoder = JsonPageDecoder::new()
        .with_record_path("results")
        .with_next_cursor_path("info.next");
    let mut source = HttpSource::new(
        HttpClient::new(),
        format!("{}/character", mock_server.uri()),
        Box::new(decoder),
    );

    let outcome = Collector::new(StoppingPolicy::ExplicitFlag)
        .with_origin(1)
        .collect(&mut source)
        .await;

    assert!(outcome.exhausted);
    assert_eq!(outcome.items.len(), 3);
    assert_eq!(outcome.stats.pages_fetched, 2);
}

// ============================================================================
// Cap flow
// ============================================================================

#[tokio::test]
async fn test_cap_finishes_page_then_stops() {
    let mock_server = MockServer::start().await;

    for page in 1..=5u32 {
        let docs: Vec<_> = (0..100)
            .map(|i| json!({"name": format!("Film {page}-{i}"), "movieLength": 90 + i}))
            .collect();
        Mock::given(method("GET"))
            .and(path("/movie"))
            .and(query_param("page", page.to_string()))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"docs": docs, "more": true})),
            )
            .mount(&mock_server)
            .await;
    }

    let decoder = JsonPageDecoder::new()
        .with_record_path("docs")
        .with_has_more_path("more");
    let mut source = HttpSource::new(
        HttpClient::new(),
        format!("{}/movie", mock_server.uri()),
        Box::new(decoder),
    )
    .with_per_page("limit", 100);

    let outcome = Collector::new(StoppingPolicy::ExplicitFlag)
        .with_origin(1)
        .with_cap(150)
        .collect(&mut source)
        .await;

    // The capping page is kept whole: two pages, 200 items
    assert_eq!(outcome.stats.pages_fetched, 2);
    assert_eq!(outcome.items.len(), 200);
    assert!(!outcome.exhausted);

    let dir = tempfile::tempdir().unwrap();
    let json_path = dir.path().join("films.json");
    JsonSink::new(&json_path).write(&outcome.items).unwrap();

    let parsed: Vec<serde_json::Value> =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(parsed.len(), 200);
}

// ============================================================================
// Partial results on failure
// ============================================================================

#[tokio::test]
async fn test_partial_results_flushed_on_mid_run_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/listing"))
        .and(query_param("page", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": 1}, {"id": 2}],
            "more": true
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/listing"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&mock_server)
        .await;

    let decoder = JsonPageDecoder::new()
        .with_record_path("items")
        .with_has_more_path("more");
    let mut source = HttpSource::new(
        HttpClient::new(),
        format!("{}/listing", mock_server.uri()),
        Box::new(decoder),
    );

    let outcome = Collector::new(StoppingPolicy::ExplicitFlag)
        .collect(&mut source)
        .await;

    assert_eq!(outcome.items.len(), 2);
    assert!(matches!(
        outcome.error,
        Some(Error::HttpStatus { status: 503, .. })
    ));

    // The partial result still lands in the sink
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("partial.csv");
    CsvSink::new(&csv_path, vec!["id".to_string()])
        .write(&outcome.items)
        .unwrap();
    assert_eq!(
        std::fs::read_to_string(&csv_path).unwrap().lines().count(),
        3
    );
}

// ============================================================================
// Decode failure mid-run
// ============================================================================

#[tokio::test]
async fn test_undecodable_page_aborts_with_partial_items() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/listing"))
        .and(query_param("page", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": 1}],
            "more": true
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/listing"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>surprise</html>"))
        .mount(&mock_server)
        .await;

    let decoder = JsonPageDecoder::new()
        .with_record_path("items")
        .with_has_more_path("more");
    let mut source = HttpSource::new(
        HttpClient::new(),
        format!("{}/listing", mock_server.uri()),
        Box::new(decoder),
    );

    let outcome = Collector::new(StoppingPolicy::ExplicitFlag)
        .collect(&mut source)
        .await;

    assert_eq!(outcome.items.len(), 1);
    assert!(matches!(outcome.error, Some(Error::Parse { .. })));
}

// ============================================================================
// Definition-driven wiring
// ============================================================================

#[tokio::test]
async fn test_definition_drives_a_real_source() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/groups"))
        .and(query_param("page", "0"))
        .and(query_param("q", "flowers"))
        .and(header("Authorization", "Bearer vk-token-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": {"items": [{"name": "Flower Shop"}]},
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/groups"))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"response": {"items": []}})),
        )
        .mount(&mock_server)
        .await;

    std::env::set_var("PAGEWALK_IT_TOKEN", "vk-token-7");
    let yaml = format!(
        r#"
name: groups
source:
  type: api
  url: "{}/groups"
  params:
    q: flowers
  headers:
    Authorization: "Bearer ${{PAGEWALK_IT_TOKEN}}"
  decode:
    records: response.items
policy: no_new_items
origin: 0
"#,
        mock_server.uri()
    );

    let definition = load_definition_from_str(&yaml).unwrap();
    let SourceKind::Api {
        url,
        params,
        headers,
        decode,
        ..
    } = &definition.source
    else {
        panic!("expected api source");
    };

    // Credential expanded from the environment, not stored in the file
    assert_eq!(
        headers.get("Authorization"),
        Some(&"Bearer vk-token-7".to_string())
    );

    let mut decoder = JsonPageDecoder::new();
    if let Some(path) = &decode.records {
        decoder = decoder.with_record_path(path);
    }
    let mut source = HttpSource::new(
        HttpClient::with_config(HttpClientConfig::default()),
        url,
        Box::new(decoder),
    )
    .with_params(params.clone());
    for (key, value) in headers {
        source = source.with_header(key, value);
    }

    let outcome = Collector::new(definition.policy)
        .with_origin(definition.origin)
        .collect(&mut source)
        .await;

    assert!(outcome.is_complete());
    assert!(outcome.exhausted);
    assert_eq!(outcome.items.len(), 1);
    assert_eq!(outcome.items[0]["name"], "Flower Shop");
}
