
use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input, Select};

use super::{Config, ConfigError, OllamaConfig, StoreBackend, VectorStoreConfig, get_config_dir};
use crate::vector_store::Distance;

#[inline]
pub fn run_interactive_config() -> Result<()> {
    eprintln!("{}", style("🔧 Pocket RAG Configuration Setup").bold().cyan());
    eprintln!();

    let config_dir = get_config_dir().context("Failed to determine config directory")?;
    let mut config = load_existing_config(&config_dir)?;

    eprintln!("{}", style("Ollama Configuration").bold().yellow());
    eprintln!("Configure the local Ollama instance used for embeddings and generation.");
    eprintln!();

    configure_ollama(&mut config.ollama)?;
    configure_models(&mut config)?;

    eprintln!();
    eprintln!("{}", style("Vector Store Configuration").bold().yellow());
    configure_vector_store(&mut config.vector_store)?;

    eprintln!();
    eprintln!("{}", style("Testing configuration...").yellow());

    if test_ollama_connection(&config.ollama) {
        eprintln!("{}", style("✓ Ollama connection successful!").green());
    } else {
        eprintln!(
            "{}",
            style("⚠ Warning: Could not connect to Ollama").yellow()
        );
        eprintln!("You can continue, but make sure Ollama is running before asking questions.");
    }

    eprintln!();
    if Confirm::new()
        .with_prompt("Save configuration?")
        .default(true)
        .interact()?
    {
        config.save().context("Failed to save configuration")?;
        eprintln!("{}", style("✓ Configuration saved successfully!").green());
        eprintln!(
            "Configuration saved to: {}",
            style(config.config_file_path().display()).cyan()
        );
    } else {
        eprintln!("Configuration not saved.");
    }

    Ok(())
}

#[inline]
pub fn show_config() -> Result<()> {
    let config_dir = get_config_dir().context("Failed to determine config directory")?;
    let config = Config::load(&config_dir).context("Failed to load configuration")?;

    eprintln!("{}", style("📋 Current Configuration").bold().cyan());
    eprintln!();

    eprintln!("{}", style("Ollama Settings:").bold().yellow());
    match config.ollama_url() {
        Ok(url) => eprintln!("  URL: {}", style(url).cyan()),
        Err(e) => eprintln!("  URL: {} ({})", style("Invalid").red(), e),
    }
    eprintln!(
        "  Embedding Model: {}",
        style(&config.embedding.model).cyan()
    );
    eprintln!(
        "  Generation Model: {}",
        style(&config.generation.model).cyan()
    );
    eprintln!("  Context Length: {}", style(config.generation.num_ctx).cyan());

    eprintln!();
    eprintln!("{}", style("Vector Store Settings:").bold().yellow());
    match config.vector_store.backend {
        StoreBackend::Qdrant => match config.qdrant_url() {
            Ok(url) => eprintln!("  Qdrant URL: {}", style(url).cyan()),
            Err(e) => eprintln!("  Qdrant URL: {} ({})", style("Invalid").red(), e),
        },
        StoreBackend::Memory => eprintln!("  Backend: {}", style("in-memory").cyan()),
    }
    eprintln!(
        "  Collection: {}",
        style(&config.vector_store.collection).cyan()
    );
    eprintln!(
        "  Vectors: {} dimensions, {} distance",
        style(config.vector_store.vector_size).cyan(),
        style(config.vector_store.distance).cyan()
    );
    eprintln!("  Retrieval Limit: {}", style(config.retrieval.limit).cyan());

    eprintln!();
    match &config.corpus.file {
        Some(path) => eprintln!("Corpus file: {}", style(path.display()).cyan()),
        None => eprintln!("Corpus: {}", style("built-in sample sentences").cyan()),
    }
    eprintln!(
        "Config file: {}",
        style(config.config_file_path().display()).dim()
    );

    Ok(())
}

fn load_existing_config(config_dir: &Path) -> Result<Config> {
    Config::load(config_dir).map_or_else(
        |_| {
            eprintln!(
                "{}",
                style("No usable configuration found. Using defaults.").yellow()
            );
            Ok(Config::with_base_dir(config_dir))
        },
        |config| {
            eprintln!("{}", style("Found existing configuration.").green());
            Ok(config)
        },
    )
}

fn select_protocol(prompt: &str, current: &str) -> Result<String> {
    let protocols = &["http", "https"];
    let default_index = protocols.iter().position(|&p| p == current).unwrap_or(0);

    let protocol_index = Select::new()
        .with_prompt(prompt)
        .default(default_index)
        .items(protocols)
        .interact()?;

    Ok(protocols[protocol_index].to_string())
}

fn configure_ollama(ollama: &mut OllamaConfig) -> Result<()> {
    let protocol = select_protocol("Ollama protocol", &ollama.protocol)?;

    let host: String = Input::new()
        .with_prompt("Ollama host")
        .default(ollama.host.clone())
        .validate_with(|input: &String| -> Result<(), ConfigError> {
            let temp_config = OllamaConfig {
                protocol: protocol.clone(),
                host: input.clone(),
                ..OllamaConfig::default()
            };
            temp_config.validate()
        })
        .interact_text()?;

    let port: u16 = Input::new()
        .with_prompt("Ollama port")
        .default(ollama.port)
        .validate_with(|input: &u16| -> Result<(), &str> {
            if *input == 0 {
                Err("Port must be greater than 0")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    ollama.set_protocol(protocol)?;
    ollama.set_host(host)?;
    ollama.set_port(port)?;

    Ok(())
}

fn non_empty(input: &String) -> Result<(), &'static str> {
    if input.trim().is_empty() {
        Err("Model name cannot be empty")
    } else {
        Ok(())
    }
}

fn configure_models(config: &mut Config) -> Result<()> {
    let embedding_model: String = Input::new()
        .with_prompt("Embedding model")
        .default(config.embedding.model.clone())
        .validate_with(non_empty)
        .interact_text()?;

    let generation_model: String = Input::new()
        .with_prompt("Generation model")
        .default(config.generation.model.clone())
        .validate_with(non_empty)
        .interact_text()?;

    let num_ctx: u32 = Input::new()
        .with_prompt("Generation context length (num_ctx)")
        .default(config.generation.num_ctx)
        .validate_with(|input: &u32| -> Result<(), &str> {
            if *input == 0 {
                Err("Context length must be greater than 0")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    config.embedding.set_model(embedding_model)?;
    config.generation.set_model(generation_model)?;
    config.generation.set_num_ctx(num_ctx)?;

    Ok(())
}

fn configure_vector_store(store: &mut VectorStoreConfig) -> Result<()> {
    let backends = &["qdrant", "memory"];
    let default_backend = match store.backend {
        StoreBackend::Qdrant => 0,
        StoreBackend::Memory => 1,
    };
    let backend_index = Select::new()
        .with_prompt("Vector store backend")
        .default(default_backend)
        .items(backends)
        .interact()?;
    store.backend = if backend_index == 0 {
        StoreBackend::Qdrant
    } else {
        StoreBackend::Memory
    };

    if store.backend == StoreBackend::Qdrant {
        store.protocol = select_protocol("Qdrant protocol", &store.protocol)?;

        store.host = Input::new()
            .with_prompt("Qdrant host")
            .default(store.host.clone())
            .interact_text()?;

        store.port = Input::new()
            .with_prompt("Qdrant port")
            .default(store.port)
            .validate_with(|input: &u16| -> Result<(), &str> {
                if *input == 0 {
                    Err("Port must be greater than 0")
                } else {
                    Ok(())
                }
            })
            .interact_text()?;
    }

    let collection: String = Input::new()
        .with_prompt("Collection name")
        .default(store.collection.clone())
        .interact_text()?;
    store.set_collection(collection)?;

    let vector_size: u64 = Input::new()
        .with_prompt("Vector size (must match the embedding model)")
        .default(store.vector_size)
        .interact_text()?;
    store.set_vector_size(vector_size)?;

    let distances = Distance::ALL;
    let default_distance = distances
        .iter()
        .position(|d| *d == store.distance)
        .unwrap_or(0);
    let distance_index = Select::new()
        .with_prompt("Distance metric")
        .default(default_distance)
        .items(&distances)
        .interact()?;
    store.distance = distances[distance_index];

    store.validate()?;
    Ok(())
}

fn test_ollama_connection(ollama: &OllamaConfig) -> bool {
    let url = format!(
        "{}://{}:{}/api/version",
        ollama.protocol, ollama.host, ollama.port
    );

    let agent: ureq::Agent = ureq::Agent::config_builder()
        .timeout_global(Some(std::time::Duration::from_secs(5)))
        .build()
        .into();

    match agent.get(&url).call() {
        Ok(_) => true,
        Err(ureq::Error::StatusCode(code)) if (400..500).contains(&code) => true,
        Err(_) => false,
    }
}
