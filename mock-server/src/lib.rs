use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;

const SAMPLES: &str = include_str!("../data/samples.json");

/// Sample records served by the samples endpoint, in response order.
pub type Samples = Arc<Vec<Value>>;

#[derive(Deserialize)]
pub struct SamplesQuery {
    pub events: Option<String>,
}

/// Every bundled sample record.
pub fn samples() -> Vec<Value> {
    serde_json::from_str(SAMPLES).expect("bundled samples are a JSON array")
}

pub fn app() -> Router {
    app_with_samples(samples())
}

/// Serve a custom set of records instead of the bundled ones.
pub fn app_with_samples(records: Vec<Value>) -> Router {
    let samples: Samples = Arc::new(records);
    Router::new()
        .route("/api/v1/message-events/events/samples", get(list_samples))
        .fallback(not_found)
        .with_state(samples)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn error_response(status: StatusCode, message: &str, code: &str, description: &str) -> Response {
    let body = json!({
        "errors": [{"message": message, "code": code, "description": description}]
    });
    (status, Json(body)).into_response()
}

fn record_type(record: &Value) -> Option<&str> {
    record.get("type").and_then(Value::as_str)
}

async fn list_samples(
    State(samples): State<Samples>,
    headers: HeaderMap,
    Query(query): Query<SamplesQuery>,
) -> Response {
    let authorized = headers
        .get(header::AUTHORIZATION)
        .is_some_and(|v| !v.is_empty());
    if !authorized {
        tracing::debug!("rejecting samples request without api key");
        return error_response(StatusCode::UNAUTHORIZED, "Unauthorized.", "", "");
    }

    let requested: Vec<&str> = query
        .events
        .as_deref()
        .map(|events| events.split(',').filter(|e| !e.is_empty()).collect())
        .unwrap_or_default();

    for kind in &requested {
        if !samples.iter().any(|r| record_type(r) == Some(*kind)) {
            return error_response(
                StatusCode::BAD_REQUEST,
                "Invalid event type",
                "1100",
                &format!("{kind} is not a valid event type"),
            );
        }
    }

    let results: Vec<&Value> = samples
        .iter()
        .filter(|r| requested.is_empty() || record_type(r).is_some_and(|t| requested.contains(&t)))
        .collect();
    tracing::debug!(count = results.len(), "serving event samples");
    Json(json!({ "results": results })).into_response()
}

async fn not_found() -> (StatusCode, Html<&'static str>) {
    (
        StatusCode::NOT_FOUND,
        Html("<html><body><h1>404 Not Found</h1></body></html>"),
    )
}
