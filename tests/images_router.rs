use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::{init_logging, test_app};

const QUERY_PATH: &str = "/v1/databases/test-db/query";

fn entry(id: &str, title: Option<&str>, url: Option<&str>) -> Value {
    let mut properties = json!({});
    if let Some(title) = title {
        properties["Title"] = json!({"title": [{"plain_text": title}]});
    }
    if let Some(url) = url {
        properties["Images"] = json!({"files": [{"file": {"url": url}}]});
    }
    json!({"id": id, "properties": properties})
}

fn page(entries: Vec<Value>, next_cursor: Option<&str>, has_more: bool) -> Value {
    json!({
        "results": entries,
        "next_cursor": next_cursor,
        "has_more": has_more,
    })
}

async fn get_images(app: &axum::Router, query: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/images{query}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&body).unwrap();
    (status, body)
}

fn ids(body: &Value) -> Vec<&str> {
    body["image_data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|image| image["id"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn missing_or_null_session_id_is_rejected() {
    init_logging();
    let app = test_app("http://127.0.0.1:9");

    for query in ["", "?session_id=", "?session_id=null"] {
        let (status, body) = get_images(&app, query).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "query: {query:?}");
        assert_eq!(body, json!({"error": "Invalid session ID"}));
    }
}

#[tokio::test]
async fn initial_request_fills_half_the_nominal_batch() {
    init_logging();
    let mock_server = MockServer::start().await;

    let entries: Vec<Value> = (1..=20)
        .map(|n| {
            entry(
                &format!("e{n}"),
                Some(&format!("Image {n}")),
                Some(&format!("https://files.example/{n}.png")),
            )
        })
        .collect();
    Mock::given(method("POST"))
        .and(path(QUERY_PATH))
        .and(header("Notion-Version", "2022-06-28"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(entries, Some("c2"), true)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = test_app(&mock_server.uri());
    let (status, body) = get_images(&app, "?session_id=abc&initial=true").await;

    assert_eq!(status, StatusCode::OK);
    // Nominal batch is 15; an initial request asks for half of it.
    assert_eq!(body["image_data"].as_array().unwrap().len(), 7);
    assert_eq!(body["next_cursor"], json!("c2"));
    assert_eq!(body["has_more"], json!(true));
    assert_eq!(
        body["image_data"][0],
        json!({
            "id": "e1",
            "title": "Image 1",
            "url": "https://files.example/1.png",
        })
    );
}

#[tokio::test]
async fn feed_deduplicates_across_pages_and_reports_exhaustion() {
    init_logging();
    let mock_server = MockServer::start().await;

    // First page: one record without a file, one with a malformed title.
    Mock::given(method("POST"))
        .and(path(QUERY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![
                entry("e1", Some("One"), Some("https://files.example/1.png")),
                entry("e2", Some("Two"), None),
                entry("e3", None, Some("https://files.example/3.png")),
            ],
            Some("c2"),
            true,
        )))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    // Second page overlaps the first and finishes the feed.
    Mock::given(method("POST"))
        .and(path(QUERY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![
                entry("e1", Some("One"), Some("https://files.example/1.png")),
                entry("e3", None, Some("https://files.example/3.png")),
                entry("e4", Some("Four"), Some("https://files.example/4.png")),
            ],
            None,
            false,
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = test_app(&mock_server.uri());

    let (status, body) = get_images(&app, "?session_id=abc").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), ["e1", "e3"]);
    assert_eq!(body["image_data"][1]["title"], json!("No Title"));
    assert_eq!(body["has_more"], json!(true));

    let (status, body) = get_images(&app, "?session_id=abc").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), ["e4"]);
    assert_eq!(body["next_cursor"], json!(null));
    assert_eq!(body["has_more"], json!(false));

    // The feed is drained: no third upstream call happens (the page mocks
    // above verify their exact call counts on drop).
    let (status, body) = get_images(&app, "?session_id=abc").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["image_data"], json!([]));
    assert_eq!(body["has_more"], json!(false));
}

#[tokio::test]
async fn upstream_failure_maps_to_500_with_diagnostic() {
    init_logging();
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(QUERY_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = test_app(&mock_server.uri());
    let (status, body) = get_images(&app, "?session_id=abc").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("500"), "got: {error}");
    assert!(error.contains("upstream exploded"), "got: {error}");
}

#[tokio::test]
async fn separate_sessions_each_see_the_full_feed() {
    init_logging();
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(QUERY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![entry(
                "e1",
                Some("One"),
                Some("https://files.example/1.png"),
            )],
            None,
            false,
        )))
        .mount(&mock_server)
        .await;

    let app = test_app(&mock_server.uri());

    let (_, first) = get_images(&app, "?session_id=alpha").await;
    let (_, second) = get_images(&app, "?session_id=beta").await;

    assert_eq!(ids(&first), ["e1"]);
    assert_eq!(ids(&second), ["e1"]);
}
