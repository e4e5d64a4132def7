// Query module
// Reformat, embed and look up a user query, then hand the augmented prompt to a generator

pub mod prompt;


use tracing::{debug, info, warn};

use crate::Result;
use crate::config::Config;
use crate::embeddings::Embedder;
use crate::generation::Generator;
use crate::vector_store::{PointId, ScoredPoint, VectorStore};

pub use prompt::{build_augmented_prompt, format_passages};

/// Text that is actually embedded for a query.
#[inline]
pub fn format_query(prefix: &str, raw_query: &str) -> String {
    format!("{prefix}{raw_query}")
}

/// A stored passage that matched a query.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedPassage {
    pub id: PointId,
    pub text: String,
    pub score: f32,
}

/// Keep only the matches that carry a `text` payload, in their original order.
#[inline]
pub fn passages_from_points(points: Vec<ScoredPoint>) -> Vec<RetrievedPassage> {
    points
        .into_iter()
        .filter_map(|point| match point.text() {
            Some(text) => Some(RetrievedPassage {
                id: point.id,
                text,
                score: point.score,
            }),
            None => {
                warn!("Skipping match {} without a text payload", point.id);
                None
            }
        })
        .collect()
}

/// Nearest-neighbour lookup of user queries against one collection.
pub struct Retriever<'a> {
    embedder: &'a dyn Embedder,
    store: &'a dyn VectorStore,
    collection: String,
    query_prefix: String,
    limit: usize,
}

impl<'a> Retriever<'a> {
    #[inline]
    pub fn new(
        embedder: &'a dyn Embedder,
        store: &'a dyn VectorStore,
        collection: impl Into<String>,
        query_prefix: impl Into<String>,
        limit: usize,
    ) -> Self {
        Self {
            embedder,
            store,
            collection: collection.into(),
            query_prefix: query_prefix.into(),
            limit,
        }
    }

    /// Collection, prefix and limit taken from `config`.
    #[inline]
    pub fn from_config(
        embedder: &'a dyn Embedder,
        store: &'a dyn VectorStore,
        config: &Config,
    ) -> Self {
        Self::new(
            embedder,
            store,
            config.vector_store.collection.as_str(),
            config.embedding.query_prefix.as_str(),
            config.retrieval.limit,
        )
    }

    #[inline]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    #[inline]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Raw matches for `raw_query`, best first, payloads included.
    #[inline]
    pub fn search(&self, raw_query: &str) -> Result<Vec<ScoredPoint>> {
        let query = format_query(&self.query_prefix, raw_query);
        let vector = self.embedder.embed(&query)?;
        let points = self
            .store
            .query(&self.collection, &vector, self.limit, true)?;
        debug!(
            "Query against {} returned {} matches",
            self.collection,
            points.len()
        );
        Ok(points)
    }

    /// Matches for `raw_query` that carry passage text.
    #[inline]
    pub fn retrieve(&self, raw_query: &str) -> Result<Vec<RetrievedPassage>> {
        Ok(passages_from_points(self.search(raw_query)?))
    }
}

/// Everything one question produced.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    pub passages: Vec<RetrievedPassage>,
    pub prompt: String,
    pub response: String,
}

/// Retrieval followed by generation over the augmented prompt.
pub struct QueryWorkflow<'a> {
    retriever: Retriever<'a>,
    generator: &'a dyn Generator,
}

impl<'a> QueryWorkflow<'a> {
    #[inline]
    pub fn new(retriever: Retriever<'a>, generator: &'a dyn Generator) -> Self {
        Self {
            retriever,
            generator,
        }
    }

    /// Answer `raw_query`. An empty retrieval still goes to the generator.
    #[inline]
    pub fn run(&self, raw_query: &str) -> Result<QueryOutcome> {
        let passages = self.retriever.retrieve(raw_query)?;
        if passages.is_empty() {
            info!("No passages retrieved; generating without context");
        } else {
            info!("Retrieved {} passages", passages.len());
        }

        let prompt = build_augmented_prompt(&format_passages(&passages), raw_query);
        let response = self.generator.generate(&prompt)?;

        Ok(QueryOutcome {
            passages,
            prompt,
            response,
        })
    }
}
