// Deterministic stand-ins for the external services

use std::cell::{Cell, RefCell};

use crate::embeddings::Embedder;
use crate::generation::Generator;
use crate::{RagError, Result, Service};

/// Bag-of-words embedder over a fixed vocabulary; unknown words are ignored.
pub(crate) struct KeywordEmbedder {
    vocabulary: Vec<&'static str>,
    inputs: RefCell<Vec<String>>,
}

impl KeywordEmbedder {
    pub(crate) fn new(vocabulary: &[&'static str]) -> Self {
        Self {
            vocabulary: vocabulary.to_vec(),
            inputs: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn dimension(&self) -> u64 {
        self.vocabulary.len() as u64
    }

    pub(crate) fn inputs(&self) -> Vec<String> {
        self.inputs.borrow().clone()
    }
}

impl Embedder for KeywordEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.inputs.borrow_mut().push(text.to_string());

        let lowered = text.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .collect();

        Ok(self
            .vocabulary
            .iter()
            .map(|term| words.iter().filter(|word| *word == term).count() as f32)
            .collect())
    }
}

/// Embeds successfully `remaining` times, then fails like an unreachable server.
pub(crate) struct FlakyEmbedder<E> {
    inner: E,
    remaining: Cell<usize>,
}

impl<E: Embedder> FlakyEmbedder<E> {
    pub(crate) fn new(inner: E, successes: usize) -> Self {
        Self {
            inner,
            remaining: Cell::new(successes),
        }
    }
}

impl<E: Embedder> Embedder for FlakyEmbedder<E> {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let remaining = self.remaining.get();
        if remaining == 0 {
            return Err(RagError::upstream(
                Service::Embedding,
                "Request to http://localhost:11434/api/embed failed: Connection refused",
            ));
        }
        self.remaining.set(remaining - 1);
        self.inner.embed(text)
    }
}

/// Echoes a fixed answer and remembers every prompt it was given.
pub(crate) struct RecordingGenerator {
    answer: String,
    prompts: RefCell<Vec<String>>,
}

impl RecordingGenerator {
    pub(crate) fn new(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            prompts: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }
}

impl Generator for RecordingGenerator {
    fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.borrow_mut().push(prompt.to_string());
        Ok(self.answer.clone())
    }
}
