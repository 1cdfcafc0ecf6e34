use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::app;
use serde_json::Value;
use tower::ServiceExt;

const SAMPLES_PATH: &str = "/api/v1/message-events/events/samples";

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn authed_get(uri: &str) -> Request<String> {
    Request::builder()
        .uri(uri)
        .header(http::header::AUTHORIZATION, "test-key")
        .body(String::new())
        .unwrap()
}

fn content_type(response: &axum::response::Response) -> &str {
    response
        .headers()
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

fn result_types(body: &Value) -> Vec<String> {
    body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["type"].as_str().unwrap().to_string())
        .collect()
}

// --- samples ---

#[tokio::test]
async fn samples_returns_every_record() {
    let resp = app().oneshot(authed_get(SAMPLES_PATH)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(content_type(&resp).starts_with("application/json"));
    let body = body_json(resp).await;
    assert_eq!(
        body["results"].as_array().unwrap().len(),
        mock_server::samples().len()
    );
}

#[tokio::test]
async fn samples_filters_by_type() {
    let resp = app()
        .oneshot(authed_get(&format!("{SAMPLES_PATH}?events=open%2Cbounce")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(result_types(&body), vec!["bounce", "open"]);
}

#[tokio::test]
async fn samples_empty_filter_returns_everything() {
    let resp = app()
        .oneshot(authed_get(&format!("{SAMPLES_PATH}?events=")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(result_types(&body).len(), mock_server::samples().len());
}

#[tokio::test]
async fn samples_unknown_type_returns_400() {
    let resp = app()
        .oneshot(authed_get(&format!("{SAMPLES_PATH}?events=delivery,bogus_kind")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["errors"][0]["code"], "1100");
    assert!(body["errors"][0]["description"]
        .as_str()
        .unwrap()
        .contains("bogus_kind"));
}

#[tokio::test]
async fn samples_without_api_key_returns_401() {
    let resp = app()
        .oneshot(Request::builder().uri(SAMPLES_PATH).body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert_eq!(body["errors"][0]["message"], "Unauthorized.");
}

#[tokio::test]
async fn custom_samples_are_served_verbatim() {
    let records = vec![serde_json::json!({"type": "delivery", "event_id": "1", "timestamp": "2"})];
    let resp = mock_server::app_with_samples(records.clone())
        .oneshot(authed_get(SAMPLES_PATH))
        .await
        .unwrap();

    let body = body_json(resp).await;
    assert_eq!(body["results"], Value::Array(records));
}

// --- fallback ---

#[tokio::test]
async fn unknown_path_returns_html_404() {
    let resp = app()
        .oneshot(authed_get("/api/v2/message-events/events/samples"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(content_type(&resp).starts_with("text/html"));
    let bytes = body_bytes(resp).await;
    assert!(std::str::from_utf8(&bytes).unwrap().contains("404"));
}
