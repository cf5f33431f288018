//! HTTP client for the summary stage
//!
//! Thin wrapper over `reqwest` exposing one call per verb. Every call returns
//! the response body on a 2xx status with a non-empty body; anything else
//! (non-2xx, empty body, DNS/TLS/connection/timeout failures) comes back as a
//! typed [`StageError`] after being logged. Nothing panics or propagates past
//! this boundary.

use qrlink_common::{Release, StageError, StageResult};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Connect and whole-request timeout applied to every call
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("qrlink/", env!("CARGO_PKG_VERSION"));

/// HTTP client owning a connection pool until closed
pub struct HttpClient {
    client: Option<reqwest::Client>,
}

impl HttpClient {
    /// Create a client with the standard 30 second timeouts
    pub fn new() -> StageResult<Self> {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    /// Create a client with custom connect/request timeouts
    pub fn with_timeout(timeout: Duration) -> StageResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| StageError::Transport(format!("building HTTP client: {}", e)))?;

        Ok(Self {
            client: Some(client),
        })
    }

    pub async fn get(&self, url: &str, headers: &[(&str, &str)]) -> StageResult<String> {
        self.execute(Method::GET, url, None, headers).await
    }

    pub async fn post(
        &self,
        url: &str,
        json_body: &str,
        headers: &[(&str, &str)],
    ) -> StageResult<String> {
        self.execute(Method::POST, url, Some(json_body), headers).await
    }

    pub async fn put(
        &self,
        url: &str,
        json_body: &str,
        headers: &[(&str, &str)],
    ) -> StageResult<String> {
        self.execute(Method::PUT, url, Some(json_body), headers).await
    }

    pub async fn delete(&self, url: &str, headers: &[(&str, &str)]) -> StageResult<String> {
        self.execute(Method::DELETE, url, None, headers).await
    }

    /// Drop the connection pool; later calls fail with a transport error
    pub fn close(&mut self) {
        if self.client.take().is_some() {
            debug!("HTTP client closed");
        }
    }

    async fn execute(
        &self,
        method: Method,
        url: &str,
        json_body: Option<&str>,
        headers: &[(&str, &str)],
    ) -> StageResult<String> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| StageError::Transport("HTTP client is closed".to_string()))?;

        let header_map = build_headers(json_body.is_some(), headers)?;

        let mut request = client.request(method.clone(), url).headers(header_map);
        if let Some(body) = json_body {
            request = request.body(body.to_string());
        }

        debug!(%method, url, "Sending HTTP request");

        let response = request.send().await.map_err(|e| {
            let message = if e.is_timeout() {
                format!("request timed out: {}", e)
            } else {
                e.to_string()
            };
            warn!(%method, url, error = %message, "Error executing HTTP request");
            StageError::Transport(message)
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(%method, url, status = status.as_u16(), "HTTP request failed");
            return Err(StageError::Status {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let body = response.text().await.map_err(|e| {
            warn!(%method, url, error = %e, "Error reading HTTP response body");
            StageError::Transport(e.to_string())
        })?;

        if body.is_empty() {
            warn!(%method, url, status = status.as_u16(), "HTTP response body was empty");
            return Err(StageError::EmptyBody);
        }

        info!(%method, url, status = status.as_u16(), bytes = body.len(), "HTTP request completed");
        Ok(body)
    }
}

impl Release for HttpClient {
    fn resource_name(&self) -> &'static str {
        "HTTP client"
    }

    fn release(&mut self) -> StageResult<()> {
        self.close();
        Ok(())
    }
}

/// Build the header map; later duplicates of a key replace earlier ones
fn build_headers(has_json_body: bool, headers: &[(&str, &str)]) -> StageResult<HeaderMap> {
    let mut map = HeaderMap::new();
    if has_json_body {
        map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }

    for (key, value) in headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| StageError::InvalidArgument(format!("header name {:?}: {}", key, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| StageError::InvalidArgument(format!("header value for {}: {}", key, e)))?;
        map.insert(name, value);
    }

    Ok(map)
}
