// Embeddings module
// Turns text into fixed-length vectors via an external embedding service

pub mod ollama;

use crate::Result;

pub use ollama::{ModelInfo, OllamaEmbedder};

/// Anything that can embed a piece of text.
pub trait Embedder {
    /// Embed `text`. Failures are reported as [`crate::RagError::Upstream`].
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
}
