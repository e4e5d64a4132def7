// Blocking JSON-over-HTTP plumbing shared by the Ollama and Qdrant clients

#[cfg(test)]
mod tests;

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use ureq::Body;
use ureq::http::Response;
use url::Url;

use crate::{RagError, Result, Service};

const MAX_ERROR_DETAIL_CHARS: usize = 512;

/// Thin wrapper over a `ureq` agent bound to one service's base URL.
///
/// Every failure is reported as [`RagError::Upstream`] tagged with the owning
/// [`Service`]. Requests are never retried.
#[derive(Debug, Clone)]
pub struct JsonClient {
    base_url: Url,
    service: Service,
    agent: ureq::Agent,
}

impl JsonClient {
    #[inline]
    pub fn new(base_url: Url, service: Service, timeout: Option<Duration>) -> Self {
        Self {
            base_url,
            service,
            agent: build_agent(timeout),
        }
    }

    #[inline]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[inline]
    pub fn service(&self) -> Service {
        self.service
    }

    #[inline]
    pub fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path)?;
        debug!("GET {}", url);

        let outcome = self.agent.get(url.as_str()).call();
        let text = self.read_body(&url, outcome)?;
        self.decode(&url, &text)
    }

    #[inline]
    pub fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.endpoint(path)?;
        let request_json = self.encode(body)?;
        debug!("POST {} ({} bytes)", url, request_json.len());

        let outcome = self
            .agent
            .post(url.as_str())
            .header("Content-Type", "application/json")
            .send(&request_json);
        let text = self.read_body(&url, outcome)?;
        self.decode(&url, &text)
    }

    #[inline]
    pub fn put<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.endpoint(path)?;
        let request_json = self.encode(body)?;
        debug!("PUT {} ({} bytes)", url, request_json.len());

        let outcome = self
            .agent
            .put(url.as_str())
            .header("Content-Type", "application/json")
            .send(&request_json);
        let text = self.read_body(&url, outcome)?;
        self.decode(&url, &text)
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(|e| {
            RagError::Config(format!(
                "Failed to build URL for {} from {}: {}",
                path, self.base_url, e
            ))
        })
    }

    fn encode<B: Serialize>(&self, body: &B) -> Result<String> {
        serde_json::to_string(body).map_err(|e| {
            RagError::upstream(self.service, format!("Failed to serialize request: {}", e))
        })
    }

    fn read_body(
        &self,
        url: &Url,
        outcome: std::result::Result<Response<Body>, ureq::Error>,
    ) -> Result<String> {
        let mut response = outcome.map_err(|e| {
            warn!("Request to {} failed: {}", url, e);
            RagError::upstream(self.service, format!("Request to {} failed: {}", url, e))
        })?;

        let status = response.status();
        let text = response.body_mut().read_to_string().map_err(|e| {
            RagError::upstream(
                self.service,
                format!("Failed to read response from {}: {}", url, e),
            )
        })?;

        if !status.is_success() {
            warn!("{} returned HTTP {}", url, status.as_u16());
            return Err(RagError::upstream(
                self.service,
                format!(
                    "{} returned HTTP {}: {}",
                    url,
                    status.as_u16(),
                    error_detail(&text)
                ),
            ));
        }

        Ok(text)
    }

    fn decode<T: DeserializeOwned>(&self, url: &Url, text: &str) -> Result<T> {
        serde_json::from_str(text).map_err(|e| {
            RagError::upstream(
                self.service,
                format!("Malformed response from {}: {}", url, e),
            )
        })
    }
}

fn build_agent(timeout: Option<Duration>) -> ureq::Agent {
    ureq::Agent::config_builder()
        .timeout_global(timeout)
        .http_status_as_error(false)
        .build()
        .into()
}

/// Pull the human-readable error out of a failing response body.
///
/// Ollama answers `{"error": "..."}`, Qdrant answers
/// `{"status": {"error": "..."}}`; anything else is passed through truncated.
pub(crate) fn error_detail(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        let message = value
            .get("error")
            .and_then(Value::as_str)
            .or_else(|| value.pointer("/status/error").and_then(Value::as_str));
        if let Some(message) = message {
            return message.to_string();
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }
    if trimmed.chars().count() > MAX_ERROR_DETAIL_CHARS {
        let mut truncated: String = trimmed.chars().take(MAX_ERROR_DETAIL_CHARS).collect();
        truncated.push_str("...");
        truncated
    } else {
        trimmed.to_string()
    }
}
