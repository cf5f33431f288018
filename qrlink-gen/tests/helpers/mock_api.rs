//! In-process HTTP server standing in for the summary API

use axum::{
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post, put},
    Router,
};
use std::time::Duration;

/// Key the mock `/generate` endpoint accepts
pub const MOCK_API_KEY: &str = "test-key";

/// Summary text returned by the mock `/generate` endpoint
pub const MOCK_SUMMARY: &str = "Example summary.";

/// Serve `app` on an ephemeral local port; returns the base URL
pub async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Should bind test listener");
    let addr = listener.local_addr().expect("Should have local address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Mock server failed");
    });

    format!("http://{}", addr)
}

/// Mock API with the routes used across the integration tests
///
/// - `POST /generate`: summary response, 401 without the right key
/// - `GET /headers`: echoes request headers as `name=value` lines
/// - `PUT /echo`: echoes the request body
/// - `DELETE /resource`: plain text
/// - `GET /missing`: 404
/// - `GET /empty`: 200 with no body
/// - `GET`/`POST /slow`: answers after two seconds
pub async fn spawn_mock_api() -> String {
    let app = Router::new()
        .route("/generate", post(generate))
        .route("/headers", get(echo_headers))
        .route("/echo", put(|body: String| async move { body }))
        .route("/resource", delete(|| async { "deleted" }))
        .route(
            "/missing",
            get(|| async { (StatusCode::NOT_FOUND, "no such resource") }),
        )
        .route("/empty", get(|| async { StatusCode::OK }))
        .route("/slow", get(slow).post(slow));

    spawn_server(app).await
}

async fn generate(headers: HeaderMap, body: String) -> (StatusCode, String) {
    let key = headers
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok());
    if key != Some(MOCK_API_KEY) {
        return (StatusCode::UNAUTHORIZED, "missing API key".to_string());
    }
    if !body.contains("summarize in 3 lines the given url") {
        return (StatusCode::BAD_REQUEST, "unexpected prompt".to_string());
    }

    let response = serde_json::json!({
        "candidates": [
            { "content": { "parts": [ { "text": MOCK_SUMMARY } ], "role": "model" } }
        ]
    });
    (StatusCode::OK, response.to_string())
}

async fn echo_headers(headers: HeaderMap) -> String {
    let mut lines: Vec<String> = headers
        .iter()
        .map(|(name, value)| format!("{}={}", name, value.to_str().unwrap_or("")))
        .collect();
    lines.sort();
    lines.join("\n")
}

async fn slow() -> &'static str {
    tokio::time::sleep(Duration::from_secs(2)).await;
    "too late"
}
