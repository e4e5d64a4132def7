// The passages that get embedded and stored before any question is asked


use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::CorpusConfig;
use crate::{RagError, Result};

pub const BUILTIN_PASSAGES: [&str; 5] = [
    "My name is rutvik",
    "I like to play cricket",
    "I like to play football",
    "I am a software engineer",
    "My name is ripal",
];

/// Ordered passages. A passage's position is its record id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corpus {
    items: Vec<String>,
}

impl Corpus {
    #[inline]
    pub fn new(items: Vec<String>) -> Self {
        Self { items }
    }

    #[inline]
    pub fn builtin() -> Self {
        Self::new(BUILTIN_PASSAGES.iter().map(ToString::to_string).collect())
    }

    /// One passage per line; blank lines and `#` comments are skipped.
    #[inline]
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            RagError::Config(format!(
                "Failed to read corpus file {}: {}",
                path.display(),
                e
            ))
        })?;

        let corpus = Self::parse(&content);
        if corpus.is_empty() {
            return Err(RagError::Config(format!(
                "Corpus file {} contains no passages",
                path.display()
            )));
        }

        debug!(
            "Loaded {} passages from {}",
            corpus.len(),
            path.display()
        );
        Ok(corpus)
    }

    #[inline]
    pub fn parse(content: &str) -> Self {
        Self::new(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(ToString::to_string)
                .collect(),
        )
    }

    #[inline]
    pub fn from_config(config: &CorpusConfig) -> Result<Self> {
        match &config.file {
            Some(path) => Self::from_file(path),
            None => Ok(Self::builtin()),
        }
    }

    #[inline]
    pub fn items(&self) -> &[String] {
        &self.items
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
