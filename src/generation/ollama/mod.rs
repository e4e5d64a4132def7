
use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use url::Url;

use super::Generator;
use crate::config::{Config, GenerationConfig};
use crate::embeddings::ollama::ensure_model_available;
use crate::http::JsonClient;
use crate::{RagError, Result, Service};

/// Ollama's `/api/generate` endpoint, non-streaming.
#[derive(Debug, Clone)]
pub struct OllamaGenerator {
    client: JsonClient,
    model: String,
    num_ctx: u32,
    fallback_response: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    num_ctx: u32,
}

impl OllamaGenerator {
    #[inline]
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = config
            .ollama_url()
            .map_err(|e| RagError::Config(format!("Failed to generate Ollama URL: {}", e)))?;

        Ok(Self::with_url(
            base_url,
            &config.generation,
            config.ollama.timeout(),
        ))
    }

    #[inline]
    pub fn with_url(base_url: Url, generation: &GenerationConfig, timeout: Option<Duration>) -> Self {
        Self {
            client: JsonClient::new(base_url, Service::Generation, timeout),
            model: generation.model.clone(),
            num_ctx: generation.num_ctx,
            fallback_response: generation.fallback_response.clone(),
        }
    }

    #[inline]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Verify the server answers and the configured model is installed.
    #[inline]
    pub fn health_check(&self) -> Result<()> {
        ensure_model_available(&self.client, &self.model)?;
        info!(
            "Health check passed for generation model {} at {}",
            self.model,
            self.client.base_url()
        );
        Ok(())
    }
}

impl Generator for OllamaGenerator {
    /// Returns the fallback text, not an error, when the service answers
    /// without a `response` string.
    #[inline]
    fn generate(&self, prompt: &str) -> Result<String> {
        debug!(
            "Generating with {} (prompt length: {}, num_ctx: {})",
            self.model,
            prompt.len(),
            self.num_ctx
        );

        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                num_ctx: self.num_ctx,
            },
        };
        let response: Map<String, Value> = self.client.post("/api/generate", &request)?;

        debug!(
            "Generation response keys: {:?}",
            response.keys().collect::<Vec<_>>()
        );

        match response.get("response").and_then(Value::as_str) {
            Some(text) => Ok(text.to_string()),
            None => {
                warn!(
                    "Generation response from {} had no text, using fallback",
                    self.model
                );
                Ok(self.fallback_response.clone())
            }
        }
    }
}
