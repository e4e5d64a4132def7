#[cfg(test)]
mod tests;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use super::Embedder;
use crate::config::Config;
use crate::http::JsonClient;
use crate::{RagError, Result, Service};

/// Ollama's `/api/embed` endpoint under one fixed model.
#[derive(Debug, Clone)]
pub struct OllamaEmbedder {
    client: JsonClient,
    model: String,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub size: Option<u64>,
    pub digest: Option<String>,
    pub details: Option<ModelDetails>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelDetails {
    pub format: Option<String>,
    pub family: Option<String>,
    pub parameter_size: Option<String>,
    pub quantization_level: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    models: Vec<ModelInfo>,
}

impl OllamaEmbedder {
    #[inline]
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = config
            .ollama_url()
            .map_err(|e| RagError::Config(format!("Failed to generate Ollama URL: {}", e)))?;

        Ok(Self::with_url(
            base_url,
            config.embedding.model.clone(),
            config.ollama.timeout(),
        ))
    }

    #[inline]
    pub fn with_url(base_url: Url, model: String, timeout: Option<Duration>) -> Self {
        Self {
            client: JsonClient::new(base_url, Service::Embedding, timeout),
            model,
        }
    }

    #[inline]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Verify the server answers and the configured model is installed.
    #[inline]
    pub fn health_check(&self) -> Result<()> {
        debug!("Performing health check for Ollama at {}", self.client.base_url());
        ensure_model_available(&self.client, &self.model)?;
        info!(
            "Health check passed for Ollama server at {} with model {}",
            self.client.base_url(),
            self.model
        );
        Ok(())
    }

    /// List all available models
    #[inline]
    pub fn list_models(&self) -> Result<Vec<ModelInfo>> {
        list_models(&self.client)
    }
}

impl Embedder for OllamaEmbedder {
    #[inline]
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!("Generating embedding for text (length: {})", text.len());

        let request = EmbedRequest {
            model: &self.model,
            input: text,
        };
        let response: EmbedResponse = self.client.post("/api/embed", &request)?;

        let embedding = response.embeddings.into_iter().next().ok_or_else(|| {
            RagError::upstream(
                Service::Embedding,
                format!("Model {} returned no embeddings", self.model),
            )
        })?;

        debug!("Generated embedding with {} dimensions", embedding.len());
        Ok(embedding)
    }
}

pub(crate) fn list_models(client: &JsonClient) -> Result<Vec<ModelInfo>> {
    debug!("Fetching available models from {}", client.base_url());
    let response: ModelsResponse = client.get("/api/tags")?;
    debug!("Found {} models", response.models.len());
    Ok(response.models)
}

/// Fail unless `model` is installed on the server behind `client`.
///
/// A bare name matches its `:latest` tag, as Ollama itself resolves it.
pub(crate) fn ensure_model_available(client: &JsonClient, model: &str) -> Result<()> {
    let models = list_models(client)?;

    if models.iter().any(|m| model_matches(&m.name, model)) {
        debug!("Model {} is available", model);
        return Ok(());
    }

    let available: Vec<&str> = models.iter().map(|m| m.name.as_str()).collect();
    warn!(
        "Model {} not found. Available models: {:?}",
        model, available
    );
    Err(RagError::upstream(
        client.service(),
        format!(
            "Model '{}' is not available. Available models: {:?}",
            model, available
        ),
    ))
}

fn model_matches(installed: &str, wanted: &str) -> bool {
    installed == wanted
        || (!wanted.contains(':') && installed.strip_suffix(":latest") == Some(wanted))
}
