// Indexer module
// Embeds every corpus passage and upserts it under its position as id


use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::corpus::Corpus;
use crate::embeddings::Embedder;
use crate::vector_store::{CollectionParams, Payload, VectorRecord, VectorStore};
use crate::{RagError, Result};

/// Where an [`Indexer`] is in its run over the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestionState {
    NotStarted,
    /// `next` is the position of the first passage not yet stored.
    InProgress { next: usize },
    Complete { ingested: usize },
}

/// Sequential ingestion of a [`Corpus`] into one collection.
///
/// There is no rollback: a failure leaves passages `0..next` stored and the
/// rest absent. Running again overwrites every id it reaches.
pub struct Indexer<'a> {
    embedder: &'a dyn Embedder,
    store: &'a dyn VectorStore,
    collection: String,
    state: IngestionState,
}

impl<'a> Indexer<'a> {
    #[inline]
    pub fn new(
        embedder: &'a dyn Embedder,
        store: &'a dyn VectorStore,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            embedder,
            store,
            collection: collection.into(),
            state: IngestionState::NotStarted,
        }
    }

    #[inline]
    pub fn state(&self) -> IngestionState {
        self.state
    }

    #[inline]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Create the target collection if it is missing. Returns whether it was
    /// created.
    #[inline]
    pub fn prepare_collection(&self, params: &CollectionParams) -> Result<bool> {
        self.store.ensure_collection(&self.collection, params)
    }

    /// Embed and upsert every passage in order. Returns how many were stored.
    #[inline]
    pub fn ingest(&mut self, corpus: &Corpus) -> Result<usize> {
        info!(
            "Ingesting {} passages into {}",
            corpus.len(),
            self.collection
        );
        self.state = IngestionState::InProgress { next: 0 };

        let bar = if console::user_attended_stderr() {
            ProgressBar::new(corpus.len() as u64).with_style(
                ProgressStyle::with_template("{spinner} [{pos}/{len}] Embedding {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            )
        } else {
            ProgressBar::hidden()
        };

        for (index, text) in corpus.items().iter().enumerate() {
            bar.set_message(text.clone());

            if let Err(e) = self.ingest_one(index, text) {
                bar.abandon();
                error!(
                    "Ingestion into {} stopped at passage {}: {}",
                    self.collection, index, e
                );
                return Err(at_passage(index, e));
            }

            self.state = IngestionState::InProgress { next: index + 1 };
            bar.inc(1);
        }

        bar.finish_and_clear();
        self.state = IngestionState::Complete {
            ingested: corpus.len(),
        };
        info!(
            "Ingested {} passages into {}",
            corpus.len(),
            self.collection
        );
        Ok(corpus.len())
    }

    fn ingest_one(&self, index: usize, text: &str) -> Result<()> {
        let vector = self.embedder.embed(text)?;
        let record = VectorRecord::new(index as u64, vector, passage_payload(text));
        self.store.upsert(&self.collection, &[record])?;
        debug!("Stored passage {} in {}", index, self.collection);
        Ok(())
    }
}

/// Payload stored with each passage; `text` is what retrieval reads back.
#[inline]
pub fn passage_payload(text: &str) -> Payload {
    let mut payload = Payload::new();
    payload.insert("text".to_string(), Value::String(text.to_string()));
    payload.insert(
        "ingested_at".to_string(),
        Value::String(Utc::now().to_rfc3339()),
    );
    payload
}

fn at_passage(index: usize, err: RagError) -> RagError {
    match err {
        RagError::Upstream { service, message } => RagError::Upstream {
            service,
            message: format!("while ingesting passage {}: {}", index, message),
        },
        other => other,
    }
}
