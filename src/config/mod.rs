// Configuration management: TOML settings, interactive setup, config directory

pub mod interactive;
pub mod settings;


use std::path::PathBuf;

pub use interactive::{run_interactive_config, show_config};
pub use settings::{
    Config, ConfigError, CorpusConfig, EmbeddingConfig, GenerationConfig, OllamaConfig,
    RetrievalConfig, StoreBackend, VectorStoreConfig,
};

/// Overrides the default `~/.pocket-rag` configuration directory.
pub const HOME_ENV_VAR: &str = "POCKET_RAG_HOME";

/// Get the configuration directory path
#[inline]
pub fn get_config_dir() -> Result<PathBuf, ConfigError> {
    if let Some(dir) = std::env::var_os(HOME_ENV_VAR).filter(|dir| !dir.is_empty()) {
        return Ok(PathBuf::from(dir));
    }

    dirs::home_dir()
        .map(|home| home.join(".pocket-rag"))
        .ok_or(ConfigError::DirectoryError)
}

/// Load the configuration from the default directory
#[inline]
pub fn load_config() -> anyhow::Result<Config> {
    let config_dir = get_config_dir()?;
    Config::load(config_dir)
}
