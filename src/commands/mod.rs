// Command bodies behind the CLI: wire configuration into clients and workflows


use std::io::{self, BufRead, IsTerminal};

use anyhow::{Context, anyhow};
use console::style;
use dialoguer::Input;
use itertools::Itertools;
use tracing::{info, warn};

use crate::config::{Config, StoreBackend, VectorStoreConfig};
use crate::corpus::Corpus;
use crate::embeddings::{Embedder, OllamaEmbedder};
use crate::generation::OllamaGenerator;
use crate::indexer::Indexer;
use crate::query::{QueryOutcome, QueryWorkflow, Retriever};
use crate::vector_store::{InMemoryStore, QdrantStore, ScoredPoint, VectorStore};
use crate::{RagError, Result};

/// Vector store selected by `[vector_store] backend`.
#[inline]
pub fn open_store(config: &VectorStoreConfig) -> Result<Box<dyn VectorStore>> {
    Ok(match config.backend {
        StoreBackend::Qdrant => Box::new(QdrantStore::new(config)?),
        StoreBackend::Memory => Box::new(InMemoryStore::new()),
    })
}

/// Trimmed prompt, or a `Config` error when nothing is left.
#[inline]
pub fn normalize_prompt(raw: &str) -> Result<String> {
    let prompt = raw.trim();
    if prompt.is_empty() {
        return Err(RagError::Config("Prompt must not be empty".to_string()));
    }
    Ok(prompt.to_string())
}

/// The prompt from the command line, else asked for on the terminal, else
/// the first line of stdin.
#[inline]
pub fn read_prompt(argument: Option<&str>) -> Result<String> {
    if let Some(prompt) = argument {
        return normalize_prompt(prompt);
    }

    let line = if io::stdin().is_terminal() {
        Input::<String>::new()
            .with_prompt("Enter a prompt")
            .allow_empty(true)
            .interact_text()
            .context("Failed to read prompt")?
    } else {
        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .context("Failed to read prompt from stdin")?;
        line
    };

    normalize_prompt(&line)
}

/// Ensure the collection exists and store every corpus passage in it.
#[inline]
pub fn ingest_into(
    config: &Config,
    embedder: &dyn Embedder,
    store: &dyn VectorStore,
) -> Result<usize> {
    let corpus = Corpus::from_config(&config.corpus)?;
    let mut indexer = Indexer::new(embedder, store, config.vector_store.collection.as_str());

    if indexer.prepare_collection(&config.vector_store.collection_params())? {
        eprintln!(
            "{} collection {}",
            style("Created").green(),
            style(indexer.collection()).cyan()
        );
    }

    indexer.ingest(&corpus)
}

/// `ingest`: populate the collection and report what it now holds.
#[inline]
pub fn ingest(config: &Config) -> Result<usize> {
    let embedder = OllamaEmbedder::new(config)?;
    let store = open_store(&config.vector_store)?;

    let ingested = ingest_into(config, &embedder, store.as_ref())?;
    let stored = store.count(&config.vector_store.collection)?;

    eprintln!(
        "{} {} passages into {} ({} points stored)",
        style("✓ Ingested").green(),
        ingested,
        style(&config.vector_store.collection).cyan(),
        stored
    );
    Ok(ingested)
}

/// `ask`: retrieve context for the prompt and print the generated answer.
#[inline]
pub fn ask(config: &Config, prompt: Option<&str>, skip_ingest: bool) -> Result<QueryOutcome> {
    let raw_query = read_prompt(prompt)?;

    let embedder = OllamaEmbedder::new(config)?;
    let generator = OllamaGenerator::new(config)?;
    let store = open_store(&config.vector_store)?;

    prepare(config, &embedder, store.as_ref(), skip_ingest)?;

    let retriever = Retriever::from_config(&embedder, store.as_ref(), config);
    let outcome = QueryWorkflow::new(retriever, &generator).run(&raw_query)?;

    println!("{}", outcome.response);
    Ok(outcome)
}

/// `search`: print the ranked matches without generating anything.
#[inline]
pub fn search(
    config: &Config,
    prompt: Option<&str>,
    limit: Option<usize>,
    skip_ingest: bool,
) -> Result<Vec<ScoredPoint>> {
    let mut config = config.clone();
    if let Some(limit) = limit {
        config.retrieval.limit = limit;
        config
            .retrieval
            .validate()
            .map_err(|e| RagError::Config(e.to_string()))?;
    }

    let raw_query = read_prompt(prompt)?;

    let embedder = OllamaEmbedder::new(&config)?;
    let store = open_store(&config.vector_store)?;

    prepare(&config, &embedder, store.as_ref(), skip_ingest)?;

    let points = Retriever::from_config(&embedder, store.as_ref(), &config).search(&raw_query)?;
    println!("{}", format_search_results(&points));
    Ok(points)
}

/// One line per match: rank, score, id and passage text.
#[inline]
pub fn format_search_results(points: &[ScoredPoint]) -> String {
    if points.is_empty() {
        return "No matches".to_string();
    }

    points
        .iter()
        .enumerate()
        .map(|(rank, point)| {
            format!(
                "{}. [{:.4}] #{} {}",
                rank + 1,
                point.score,
                point.id,
                point.text().unwrap_or_else(|| "<no text>".to_string())
            )
        })
        .join("\n")
}

/// `check`: report whether every configured service is reachable.
#[inline]
pub fn check(config: &Config) -> Result<()> {
    eprintln!("{}", style("Pocket RAG health check").bold().cyan());
    let mut failures = 0;

    let embedder = OllamaEmbedder::new(config)?;
    match embedder.health_check() {
        Ok(()) => eprintln!(
            "  {} Embedding model {}",
            style("✓").green(),
            style(embedder.model()).cyan()
        ),
        Err(e) => {
            failures += 1;
            eprintln!("  {} Embedding model: {}", style("✗").red(), e);
        }
    }

    let generator = OllamaGenerator::new(config)?;
    match generator.health_check() {
        Ok(()) => eprintln!(
            "  {} Generation model {}",
            style("✓").green(),
            style(generator.model()).cyan()
        ),
        Err(e) => {
            failures += 1;
            eprintln!("  {} Generation model: {}", style("✗").red(), e);
        }
    }

    match config.vector_store.backend {
        StoreBackend::Memory => eprintln!(
            "  {} Vector store: in-memory, nothing to check",
            style("✓").green()
        ),
        StoreBackend::Qdrant => {
            if let Err(e) = check_qdrant(config) {
                failures += 1;
                eprintln!("  {} Vector store: {}", style("✗").red(), e);
            }
        }
    }

    if failures > 0 {
        return Err(anyhow!("{} health check(s) failed", failures).into());
    }
    Ok(())
}

fn check_qdrant(config: &Config) -> Result<()> {
    let store = QdrantStore::new(&config.vector_store)?;
    let server = store.server_info()?;
    eprintln!(
        "  {} Qdrant {} at {}",
        style("✓").green(),
        server.version,
        style(store.base_url()).cyan()
    );

    let collection = &config.vector_store.collection;
    if store.collection_exists(collection)? {
        eprintln!(
            "  {} Collection {} holds {} points",
            style("✓").green(),
            style(collection).cyan(),
            store.count(collection)?
        );
    } else {
        eprintln!(
            "  {} Collection {} does not exist yet",
            style("·").dim(),
            style(collection).cyan()
        );
    }
    Ok(())
}

fn prepare(
    config: &Config,
    embedder: &dyn Embedder,
    store: &dyn VectorStore,
    skip_ingest: bool,
) -> Result<()> {
    if skip_ingest {
        if config.vector_store.backend == StoreBackend::Memory {
            warn!("Skipping ingestion with the in-memory store leaves nothing to search");
        }
        info!("Skipping ingestion");
        return Ok(());
    }

    ingest_into(config, embedder, store)?;
    Ok(())
}
