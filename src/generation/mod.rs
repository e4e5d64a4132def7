// Generation module
// Sends prompts to an external text-generation service

pub mod ollama;

use crate::Result;

pub use ollama::OllamaGenerator;

/// Anything that can complete a prompt.
pub trait Generator {
    fn generate(&self, prompt: &str) -> Result<String>;
}
