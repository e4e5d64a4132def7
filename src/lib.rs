use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RagError>;

/// External collaborator that produced an [`RagError::Upstream`] failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Embedding,
    Generation,
    VectorStore,
}

impl fmt::Display for Service {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Embedding => "Embedding service",
            Self::Generation => "Generation service",
            Self::VectorStore => "Vector store",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum RagError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{service} error: {message}")]
    Upstream { service: Service, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl RagError {
    #[inline]
    pub fn upstream(service: Service, message: impl Into<String>) -> Self {
        Self::Upstream {
            service,
            message: message.into(),
        }
    }

    /// The failing service, if this error came from one.
    #[inline]
    pub fn service(&self) -> Option<Service> {
        match self {
            Self::Upstream { service, .. } => Some(*service),
            _ => None,
        }
    }
}

pub mod commands;
pub mod config;
pub mod corpus;
pub mod embeddings;
pub mod generation;
pub mod http;
pub mod indexer;
pub mod query;
pub mod vector_store;

#[cfg(test)]
mod test_support;
