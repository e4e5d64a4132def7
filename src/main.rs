use clap::{Parser, Subcommand};
use pocket_rag::Result;
use pocket_rag::commands::{ask, check, ingest, search};
use pocket_rag::config::{load_config, run_interactive_config, show_config};

#[derive(Parser)]
#[command(name = "pocket-rag")]
#[command(about = "Answer questions from a small corpus with local embeddings, Qdrant and Ollama")]
#[command(version)]
struct Cli {
    /// Defaults to `ask` when omitted
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest the corpus, retrieve passages for a prompt and generate an answer
    Ask {
        /// Prompt to answer; read from the terminal or stdin when omitted
        prompt: Option<String>,
        /// Query the collection as it is, without ingesting the corpus first
        #[arg(long)]
        skip_ingest: bool,
    },
    /// Ingest the corpus and print the nearest passages for a prompt
    Search {
        /// Prompt to search for; read from the terminal or stdin when omitted
        prompt: Option<String>,
        /// Number of matches to print (overrides the configured limit)
        #[arg(long)]
        limit: Option<usize>,
        /// Query the collection as it is, without ingesting the corpus first
        #[arg(long)]
        skip_ingest: bool,
    },
    /// Embed the corpus and store it in the vector store
    Ingest,
    /// Check that Ollama, the configured models and the vector store are reachable
    Check,
    /// Configure services and models
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Ask {
        prompt: None,
        skip_ingest: false,
    });

    match command {
        Commands::Config { show } => {
            if show {
                show_config()?;
            } else {
                run_interactive_config()?;
            }
        }
        Commands::Ask {
            prompt,
            skip_ingest,
        } => {
            ask(&load_config()?, prompt.as_deref(), skip_ingest)?;
        }
        Commands::Search {
            prompt,
            limit,
            skip_ingest,
        } => {
            search(&load_config()?, prompt.as_deref(), limit, skip_ingest)?;
        }
        Commands::Ingest => {
            ingest(&load_config()?)?;
        }
        Commands::Check => {
            check(&load_config()?)?;
        }
    }

    Ok(())
}
