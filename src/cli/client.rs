use anyhow::{anyhow, Context};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::cli::config::{self, ServerStatus};

/// Thin JSON client for the progress API.
///
/// Unwraps the `{"success": true, "data": ...}` envelope and turns
/// `{"success": false, "error": ...}` bodies into errors.
pub struct ApiClient {
    base: Url,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(server: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config::REQUEST_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            base: config::parse_server_url(server)?,
            http,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub async fn get(&self, path: &str) -> anyhow::Result<Value> {
        self.send(Method::GET, path, None::<&()>).await
    }

    pub async fn post<B: Serialize>(&self, path: &str, body: Option<&B>) -> anyhow::Result<Value> {
        self.send(Method::POST, path, body).await
    }

    pub async fn put<B: Serialize>(&self, path: &str, body: &B) -> anyhow::Result<Value> {
        self.send(Method::PUT, path, Some(body)).await
    }

    pub async fn patch<B: Serialize>(&self, path: &str, body: &B) -> anyhow::Result<Value> {
        self.send(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> anyhow::Result<Value> {
        self.send(Method::DELETE, path, None::<&()>).await
    }

    pub async fn ping(&self) -> ServerStatus {
        let Ok(url) = self.base.join("health") else {
            return ServerStatus::Down;
        };
        match self.http.get(url).send().await {
            Ok(response) if response.status().is_success() => ServerStatus::Up,
            Ok(response) if response.status() == StatusCode::SERVICE_UNAVAILABLE => ServerStatus::Degraded,
            _ => ServerStatus::Down,
        }
    }

    async fn send<B: Serialize>(&self, method: Method, path: &str, body: Option<&B>) -> anyhow::Result<Value> {
        let url = self
            .base
            .join(path.trim_start_matches('/'))
            .with_context(|| format!("invalid request path '{}'", path))?;
        tracing::debug!(%method, %url, "sending request");

        let mut request = self.http.request(method, url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request
            .send()
            .await
            .with_context(|| format!("request to {} failed", url))?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }

        let body: Value = response
            .json()
            .await
            .with_context(|| format!("invalid JSON response from {}", url))?;
        unwrap_envelope(status, body)
    }
}

fn unwrap_envelope(status: StatusCode, body: Value) -> anyhow::Result<Value> {
    if status.is_success() && body["success"] == Value::Bool(true) {
        return Ok(body.get("data").cloned().unwrap_or(Value::Null));
    }
    let message = body["error"].as_str().unwrap_or("request failed");
    match body["code"].as_str() {
        Some(code) => Err(anyhow!("{} ({}, HTTP {})", message, code, status.as_u16())),
        None => Err(anyhow!("{} (HTTP {})", message, status.as_u16())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unwraps_success_envelope() {
        let data = unwrap_envelope(StatusCode::OK, json!({"success": true, "data": {"a": 1}})).unwrap();
        assert_eq!(data, json!({"a": 1}));
    }

    #[test]
    fn error_envelope_becomes_error() {
        let err = unwrap_envelope(
            StatusCode::BAD_REQUEST,
            json!({"success": false, "error": "unknown stage key 'payment'", "code": "INVALID_STAGE"}),
        )
        .unwrap_err();
        let text = err.to_string();
        assert!(text.contains("payment"));
        assert!(text.contains("INVALID_STAGE"));
        assert!(text.contains("400"));
    }
}
