// Vector store gateway: collection management, upserts and similarity queries

pub mod memory;
pub mod qdrant;


use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::Result;

pub use memory::InMemoryStore;
pub use qdrant::QdrantStore;

/// Arbitrary JSON metadata stored alongside a vector.
pub type Payload = Map<String, Value>;

/// Similarity function a collection is configured with.
///
/// Variant names match the server's wire format.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Distance {
    #[default]
    Cosine,
    Dot,
    Euclid,
    Manhattan,
}

impl Distance {
    pub const ALL: [Distance; 4] = [
        Distance::Cosine,
        Distance::Dot,
        Distance::Euclid,
        Distance::Manhattan,
    ];

    /// Whether a larger score means a closer match.
    #[inline]
    pub fn higher_is_better(self) -> bool {
        matches!(self, Self::Cosine | Self::Dot)
    }
}

impl fmt::Display for Distance {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Cosine => "Cosine",
            Self::Dot => "Dot",
            Self::Euclid => "Euclid",
            Self::Manhattan => "Manhattan",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct CollectionParams {
    #[serde(rename = "size")]
    pub vector_size: u64,
    pub distance: Distance,
}

/// Point identifier. Records written here always use integers, but a shared
/// collection may also hold UUID-keyed points.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(untagged)]
pub enum PointId {
    Num(u64),
    Uuid(String),
}

impl From<u64> for PointId {
    #[inline]
    fn from(id: u64) -> Self {
        Self::Num(id)
    }
}

impl fmt::Display for PointId {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(id) => write!(f, "{}", id),
            Self::Uuid(id) => f.write_str(id),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VectorRecord {
    pub id: u64,
    pub vector: Vec<f32>,
    pub payload: Payload,
}

impl VectorRecord {
    #[inline]
    pub fn new(id: u64, vector: Vec<f32>, payload: Payload) -> Self {
        Self {
            id,
            vector,
            payload,
        }
    }
}

/// One similarity-query match, best matches first in any returned list.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ScoredPoint {
    pub id: PointId,
    pub score: f32,
    #[serde(default)]
    pub payload: Option<Payload>,
}

impl ScoredPoint {
    /// The payload's `text` entry, rendered as JSON when it is not a string.
    #[inline]
    pub fn text(&self) -> Option<String> {
        let value = self.payload.as_ref()?.get("text")?;
        Some(match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
    }
}

/// Collection-oriented vector database.
///
/// Implementations report every failure as [`crate::RagError::Upstream`]
/// with [`crate::Service::VectorStore`].
pub trait VectorStore {
    fn collection_exists(&self, collection: &str) -> Result<bool>;

    fn create_collection(&self, collection: &str, params: &CollectionParams) -> Result<()>;

    /// Insert or replace each record by id; the last write for an id wins.
    fn upsert(&self, collection: &str, records: &[VectorRecord]) -> Result<()>;

    /// Nearest neighbours of `vector`, best first, at most `limit` long.
    fn query(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
        with_payload: bool,
    ) -> Result<Vec<ScoredPoint>>;

    fn count(&self, collection: &str) -> Result<u64>;

    /// Create the collection unless it already exists. Returns whether it was
    /// created. An existing collection is left untouched even if it was set
    /// up with different parameters.
    #[inline]
    fn ensure_collection(&self, collection: &str, params: &CollectionParams) -> Result<bool> {
        if self.collection_exists(collection)? {
            debug!("Collection {} already exists", collection);
            return Ok(false);
        }

        self.create_collection(collection, params)?;
        info!(
            "Created collection {} ({} dimensions, {} distance)",
            collection, params.vector_size, params.distance
        );
        Ok(true)
    }
}
