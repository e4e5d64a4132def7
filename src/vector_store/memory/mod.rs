
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use super::{CollectionParams, Distance, Payload, PointId, ScoredPoint, VectorRecord, VectorStore};
use crate::{RagError, Result, Service};

/// In-process [`VectorStore`] with exact (brute force) scoring.
///
/// Holds everything for the lifetime of the value, which is enough for a
/// single ingest-then-query run and for tests. Not `Sync`.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    collections: RefCell<HashMap<String, MemoryCollection>>,
}

#[derive(Debug)]
struct MemoryCollection {
    params: CollectionParams,
    points: BTreeMap<u64, StoredPoint>,
}

#[derive(Debug, Clone)]
struct StoredPoint {
    vector: Vec<f32>,
    payload: Payload,
}

impl InMemoryStore {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parameters a collection was created with.
    #[inline]
    pub fn collection_params(&self, collection: &str) -> Option<CollectionParams> {
        self.collections
            .borrow()
            .get(collection)
            .map(|stored| stored.params)
    }

    fn missing(collection: &str) -> RagError {
        RagError::upstream(
            Service::VectorStore,
            format!("Collection `{}` doesn't exist", collection),
        )
    }

    fn check_dimension(params: &CollectionParams, actual: usize) -> Result<()> {
        if actual as u64 != params.vector_size {
            return Err(RagError::upstream(
                Service::VectorStore,
                format!(
                    "Vector dimension error: expected dim: {}, got {}",
                    params.vector_size, actual
                ),
            ));
        }
        Ok(())
    }
}

impl VectorStore for InMemoryStore {
    #[inline]
    fn collection_exists(&self, collection: &str) -> Result<bool> {
        Ok(self.collections.borrow().contains_key(collection))
    }

    #[inline]
    fn create_collection(&self, collection: &str, params: &CollectionParams) -> Result<()> {
        let mut collections = self.collections.borrow_mut();
        if collections.contains_key(collection) {
            return Err(RagError::upstream(
                Service::VectorStore,
                format!("Collection `{}` already exists", collection),
            ));
        }

        collections.insert(
            collection.to_string(),
            MemoryCollection {
                params: *params,
                points: BTreeMap::new(),
            },
        );
        Ok(())
    }

    #[inline]
    fn upsert(&self, collection: &str, records: &[VectorRecord]) -> Result<()> {
        let mut collections = self.collections.borrow_mut();
        let stored = collections
            .get_mut(collection)
            .ok_or_else(|| Self::missing(collection))?;

        // Validate everything first so a rejected batch writes nothing.
        for record in records {
            Self::check_dimension(&stored.params, record.vector.len())?;
        }

        for record in records {
            stored.points.insert(
                record.id,
                StoredPoint {
                    vector: record.vector.clone(),
                    payload: record.payload.clone(),
                },
            );
        }

        debug!(
            "Upserted {} points into in-memory collection {}",
            records.len(),
            collection
        );
        Ok(())
    }

    #[inline]
    fn query(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
        with_payload: bool,
    ) -> Result<Vec<ScoredPoint>> {
        let collections = self.collections.borrow();
        let stored = collections
            .get(collection)
            .ok_or_else(|| Self::missing(collection))?;
        Self::check_dimension(&stored.params, vector.len())?;

        let distance = stored.params.distance;
        let mut scored: Vec<ScoredPoint> = stored
            .points
            .iter()
            .map(|(id, point)| ScoredPoint {
                id: PointId::Num(*id),
                score: score(distance, vector, &point.vector),
                payload: (with_payload && !point.payload.is_empty())
                    .then(|| point.payload.clone()),
            })
            .collect();

        scored.sort_by(|a, b| {
            let by_score = if distance.higher_is_better() {
                b.score.total_cmp(&a.score)
            } else {
                a.score.total_cmp(&b.score)
            };
            by_score.then_with(|| a.id.cmp(&b.id))
        });
        scored.truncate(limit);

        Ok(scored)
    }

    #[inline]
    fn count(&self, collection: &str) -> Result<u64> {
        self.collections
            .borrow()
            .get(collection)
            .map(|stored| stored.points.len() as u64)
            .ok_or_else(|| Self::missing(collection))
    }
}

/// Score `candidate` against `query` the way the server reports it:
/// similarity for Cosine/Dot, distance for Euclid/Manhattan.
pub(crate) fn score(distance: Distance, query: &[f32], candidate: &[f32]) -> f32 {
    match distance {
        Distance::Cosine => cosine_similarity(query, candidate),
        Distance::Dot => dot(query, candidate),
        Distance::Euclid => query
            .iter()
            .zip(candidate)
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f32>()
            .sqrt(),
        Distance::Manhattan => query
            .iter()
            .zip(candidate)
            .map(|(a, b)| (a - b).abs())
            .sum(),
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Zero vectors have no direction and score 0 against everything.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let norm_a = dot(a, a).sqrt();
    let norm_b = dot(b, b).sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot(a, b) / (norm_a * norm_b)
}
