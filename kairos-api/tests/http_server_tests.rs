//! HTTP Server & Routing Integration Tests
//!
//! Drives `build_router` in-process with multipart uploads. External APIs for
//! the assisted pipeline are served by `httpmock`.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use httpmock::prelude::*;
use kairos_api::config::{PipelineMode, ServiceConfig};
use kairos_api::{build_router, AppState};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "kairos-test-boundary";

/// Test config writing uploads into `upload_dir`
fn test_config(upload_dir: &TempDir, pipeline: PipelineMode) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.pipeline = pipeline;
    config.upload_dir = upload_dir.path().join("data");
    config
}

fn assisted_config(upload_dir: &TempDir, gemini: &MockServer, shopping: &MockServer) -> ServiceConfig {
    let mut config = test_config(upload_dir, PipelineMode::Assisted);
    config.gemini.api_base = gemini.base_url();
    config.gemini.api_key = Some("gemini-key".to_string());
    config.gemini.model = "gemini-test".to_string();
    config.shopping.api_base = shopping.base_url();
    config.shopping.api_key = Some("serp-key".to_string());
    config
}

fn app(config: ServiceConfig) -> axum::Router {
    build_router(AppState::new(config).unwrap())
}

/// Build a multipart body with optional `image` and `vibe` parts
fn multipart_body(image: Option<(&str, &[u8])>, vibe: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some((file_name, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\nContent-Type: image/jpeg\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    if let Some(vibe) = vibe {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"vibe\"\r\n\r\n{vibe}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn analyze_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/analyze-room")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

async fn mock_gemini<'a>(server: &'a MockServer, text: &str) -> httpmock::Mock<'a> {
    let text = text.to_string();
    server
        .mock_async(move |when, then| {
            when.method(POST)
                .path("/models/gemini-test:generateContent")
                .query_param("key", "gemini-key");
            then.status(200).json_body(json!({
                "candidates": [{"content": {"parts": [{"text": text}]}}]
            }));
        })
        .await
}

async fn mock_search<'a>(server: &'a MockServer, query: &str, titles: &[&str]) -> httpmock::Mock<'a> {
    let query = query.to_string();
    let results: Vec<Value> = titles
        .iter()
        .map(|t| {
            json!({
                "title": t,
                "price": "$10.00",
                "thumbnail": format!("https://img.test/{t}.jpg"),
                "link": format!("https://shop.test/{t}"),
            })
        })
        .collect();
    server
        .mock_async(move |when, then| {
            when.method(GET)
                .path("/search.json")
                .query_param("q", query)
                .query_param("api_key", "serp-key");
            then.status(200).json_body(json!({ "shopping_results": results }));
        })
        .await
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let dir = TempDir::new().unwrap();
    let app = app(test_config(&dir, PipelineMode::Rules));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "kairos-api");
    assert_eq!(body["pipeline"], "rules");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let dir = TempDir::new().unwrap();
    let app = app(test_config(&dir, PipelineMode::Rules));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("origin", "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
}

// =============================================================================
// Rules pipeline
// =============================================================================

#[tokio::test]
async fn test_rules_first_vibe_match_wins() {
    let dir = TempDir::new().unwrap();
    let app = app(test_config(&dir, PipelineMode::Rules));

    let body = multipart_body(Some(("room.jpg", b"jpeg".as_slice())), Some("cozy and minimal"));
    let response = app.oneshot(analyze_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["vibe_tags"], json!(["warm lighting", "wood", "plants"]));
    assert_eq!(
        body["layout"],
        json!([
            {"label": "empty wall", "box": [100, 100, 300, 300]},
            {"label": "corner", "box": [400, 400, 500, 500]}
        ])
    );
    assert_eq!(
        body["suggestions"],
        json!([{"action": "place", "item": "floor lamp", "location": [400, 400, 500, 500]}])
    );
    assert!(body.get("products").is_none());
}

#[tokio::test]
async fn test_rules_default_vibe_hangs_art() {
    let dir = TempDir::new().unwrap();
    let app = app(test_config(&dir, PipelineMode::Rules));

    let body = multipart_body(Some(("room.jpg", b"jpeg".as_slice())), Some("eclectic"));
    let response = app.oneshot(analyze_request(body)).await.unwrap();

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["vibe_tags"], json!(["art", "decor"]));
    assert_eq!(
        body["suggestions"],
        json!([{"action": "hang", "item": "framed art", "location": [100, 100, 300, 300]}])
    );
}

#[tokio::test]
async fn test_rules_minimal_vibe_no_suggestions() {
    let dir = TempDir::new().unwrap();
    let app = app(test_config(&dir, PipelineMode::Rules));

    let body = multipart_body(Some(("room.jpg", b"jpeg".as_slice())), Some("MINIMAL"));
    let response = app.oneshot(analyze_request(body)).await.unwrap();

    let body = extract_json(response.into_body()).await;
    assert_eq!(
        body["vibe_tags"],
        json!(["neutral tones", "clean lines", "negative space"])
    );
    assert_eq!(body["suggestions"], json!([]));
}

#[tokio::test]
async fn test_rules_saves_upload_under_upload_dir() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir, PipelineMode::Rules);
    let upload_dir = config.upload_dir.clone();
    let app = app(config);

    let body = multipart_body(Some(("../../living-room.jpg", b"photo-bytes".as_slice())), Some("cozy"));
    let response = app.oneshot(analyze_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let saved = upload_dir.join("living-room.jpg");
    assert_eq!(std::fs::read(saved).unwrap(), b"photo-bytes");
}

#[tokio::test]
async fn test_missing_vibe_is_422() {
    let dir = TempDir::new().unwrap();
    let app = app(test_config(&dir, PipelineMode::Rules));

    let body = multipart_body(Some(("room.jpg", b"jpeg".as_slice())), None);
    let response = app.oneshot(analyze_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "MISSING_FIELD");
    assert!(body["error"]["message"].as_str().unwrap().contains("vibe"));
}

#[tokio::test]
async fn test_missing_image_is_422() {
    let dir = TempDir::new().unwrap();
    let app = app(test_config(&dir, PipelineMode::Rules));

    let body = multipart_body(None, Some("cozy"));
    let response = app.oneshot(analyze_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = extract_json(response.into_body()).await;
    assert!(body["error"]["message"].as_str().unwrap().contains("image"));
}

#[tokio::test]
async fn test_non_multipart_body_rejected() {
    let dir = TempDir::new().unwrap();
    let app = app(test_config(&dir, PipelineMode::Rules));

    let request = Request::builder()
        .method("POST")
        .uri("/analyze-room")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"vibe": "cozy"}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_oversized_upload_is_413() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(&dir, PipelineMode::Rules);
    config.max_upload_bytes = 64;
    let app = app(config);

    let big = vec![0u8; 4096];
    let body = multipart_body(Some(("room.jpg", big.as_slice())), Some("cozy"));
    let response = app.oneshot(analyze_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

// =============================================================================
// Assisted pipeline
// =============================================================================

#[tokio::test]
async fn test_assisted_aggregates_model_and_products() {
    let dir = TempDir::new().unwrap();
    let gemini = MockServer::start_async().await;
    let shopping = MockServer::start_async().await;

    let gemini_mock = mock_gemini(&gemini, "Try a jute rug and brass accents.").await;
    let art_mock = mock_search(&shopping, "framed art", &["print-a", "print-b"]).await;
    let lamp_mock = mock_search(&shopping, "floor lamp", &["lamp-a", "lamp-b", "lamp-c", "lamp-d"]).await;

    let app = app(assisted_config(&dir, &gemini, &shopping));
    let body = multipart_body(Some(("room.jpg", b"jpeg".as_slice())), Some("cozy"));
    let response = app.oneshot(analyze_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    gemini_mock.assert_async().await;
    art_mock.assert_async().await;
    lamp_mock.assert_async().await;

    let body = extract_json(response.into_body()).await;
    assert_eq!(
        body["suggestions"],
        json!([
            {"action": "hang", "item": "framed art", "location": [100, 100, 300, 300]},
            {"action": "place", "item": "floor lamp", "location": [400, 400, 500, 500]}
        ])
    );
    assert_eq!(body["layout"]["room_type"], "living room");
    assert_eq!(body["layout"]["objects"].as_array().unwrap().len(), 2);
    assert_eq!(body["vibe_tags"], json!(["warm lighting", "wood", "plants"]));
    assert_eq!(body["gemini_design_ideas"], "Try a jute rug and brass accents.");

    let titles: Vec<&str> = body["products"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["print-a", "print-b", "lamp-a", "lamp-b", "lamp-c"]);
    assert_eq!(body["products"][0]["thumbnail"], "https://img.test/print-a.jpg");
    assert_eq!(body["products"][0]["link"], "https://shop.test/print-a");
}

#[tokio::test]
async fn test_assisted_suggestions_ignore_vibe() {
    for vibe in ["cozy", "minimal", "brutalist", ""] {
        let dir = TempDir::new().unwrap();
        let gemini = MockServer::start_async().await;
        let shopping = MockServer::start_async().await;
        mock_gemini(&gemini, "ideas").await;
        mock_search(&shopping, "framed art", &[]).await;
        mock_search(&shopping, "floor lamp", &[]).await;

        let app = app(assisted_config(&dir, &gemini, &shopping));
        let body = multipart_body(Some(("room.jpg", b"jpeg".as_slice())), Some(vibe));
        let response = app.oneshot(analyze_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK, "vibe {:?}", vibe);
        let body = extract_json(response.into_body()).await;
        let items: Vec<&str> = body["suggestions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["item"].as_str().unwrap())
            .collect();
        assert_eq!(items, vec!["framed art", "floor lamp"], "vibe {:?}", vibe);
    }
}

#[tokio::test]
async fn test_assisted_forwards_vibe_to_model() {
    let dir = TempDir::new().unwrap();
    let gemini = MockServer::start_async().await;
    let shopping = MockServer::start_async().await;

    let gemini_mock = gemini
        .mock_async(|when, then| {
            when.method(POST)
                .path("/models/gemini-test:generateContent")
                .body_contains("Japandi with terracotta");
            then.status(200).json_body(json!({
                "candidates": [{"content": {"parts": [{"text": "ok"}]}}]
            }));
        })
        .await;
    mock_search(&shopping, "framed art", &[]).await;
    mock_search(&shopping, "floor lamp", &[]).await;

    let app = app(assisted_config(&dir, &gemini, &shopping));
    let body = multipart_body(Some(("room.jpg", b"jpeg".as_slice())), Some("Japandi with terracotta"));
    let response = app.oneshot(analyze_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    gemini_mock.assert_async().await;
}

#[tokio::test]
async fn test_assisted_failed_search_degrades_to_empty() {
    let dir = TempDir::new().unwrap();
    let gemini = MockServer::start_async().await;
    let shopping = MockServer::start_async().await;

    mock_gemini(&gemini, "ideas").await;
    shopping
        .mock_async(|when, then| {
            when.method(GET).path("/search.json").query_param("q", "framed art");
            then.status(500).body("upstream exploded");
        })
        .await;
    mock_search(&shopping, "floor lamp", &["lamp-a"]).await;

    let app = app(assisted_config(&dir, &gemini, &shopping));
    let body = multipart_body(Some(("room.jpg", b"jpeg".as_slice())), Some("cozy"));
    let response = app.oneshot(analyze_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["products"].as_array().unwrap().len(), 1);
    assert_eq!(body["products"][0]["title"], "lamp-a");
}

#[tokio::test]
async fn test_assisted_model_failure_is_500() {
    let dir = TempDir::new().unwrap();
    let gemini = MockServer::start_async().await;
    let shopping = MockServer::start_async().await;

    gemini
        .mock_async(|when, then| {
            when.method(POST);
            then.status(503).body("overloaded");
        })
        .await;
    let search_mock = mock_search(&shopping, "framed art", &["print-a"]).await;

    let app = app(assisted_config(&dir, &gemini, &shopping));
    let body = multipart_body(Some(("room.jpg", b"jpeg".as_slice())), Some("cozy"));
    let response = app.oneshot(analyze_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");
    assert_eq!(search_mock.hits_async().await, 0);
}

#[tokio::test]
async fn test_assisted_without_credentials_is_config_error() {
    let dir = TempDir::new().unwrap();
    let app = app(test_config(&dir, PipelineMode::Assisted));

    let body = multipart_body(Some(("room.jpg", b"jpeg".as_slice())), Some("cozy"));
    let response = app.oneshot(analyze_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "CONFIG_ERROR");
}

#[tokio::test]
async fn test_assisted_missing_shopping_key_skips_model_call() {
    let dir = TempDir::new().unwrap();
    let gemini = MockServer::start_async().await;
    let shopping = MockServer::start_async().await;
    let gemini_mock = mock_gemini(&gemini, "ideas").await;

    let mut config = assisted_config(&dir, &gemini, &shopping);
    config.shopping.api_key = None;
    let app = app(config);

    let body = multipart_body(Some(("room.jpg", b"jpeg".as_slice())), Some("cozy"));
    let response = app.oneshot(analyze_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "CONFIG_ERROR");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("KAIROS_SERPAPI_API_KEY"));
    assert_eq!(gemini_mock.hits_async().await, 0);
}

#[tokio::test]
async fn test_assisted_null_product_fields_still_succeed() {
    let dir = TempDir::new().unwrap();
    let gemini = MockServer::start_async().await;
    let shopping = MockServer::start_async().await;
    mock_gemini(&gemini, "ideas").await;
    shopping
        .mock_async(|when, then| {
            when.method(GET).path("/search.json");
            then.status(200).json_body(json!({
                "shopping_results": [{"title": "A", "price": null, "thumbnail": null, "link": "https://shop.test/a"}]
            }));
        })
        .await;

    let app = app(assisted_config(&dir, &gemini, &shopping));
    let body = multipart_body(Some(("room.jpg", b"jpeg".as_slice())), Some("cozy"));
    let response = app.oneshot(analyze_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["products"].as_array().unwrap().len(), 2);
    assert_eq!(body["products"][0]["price"], "");
}
