
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::{CollectionParams, ScoredPoint, VectorRecord, VectorStore};
use crate::config::VectorStoreConfig;
use crate::http::JsonClient;
use crate::{RagError, Result, Service};

/// [`VectorStore`] backed by a Qdrant server's REST API.
#[derive(Debug, Clone)]
pub struct QdrantStore {
    client: JsonClient,
}

/// Every Qdrant REST answer wraps its data in `result`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    result: T,
}

#[derive(Debug, Deserialize)]
struct ExistsResult {
    exists: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    points: Vec<ScoredPoint>,
}

#[derive(Debug, Deserialize)]
struct CountResult {
    count: u64,
}

#[derive(Debug, Deserialize)]
struct UpdateResult {
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreateCollectionRequest<'a> {
    vectors: &'a CollectionParams,
}

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    points: &'a [VectorRecord],
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    query: &'a [f32],
    limit: usize,
    with_payload: bool,
}

#[derive(Debug, Serialize)]
struct CountRequest {
    exact: bool,
}

/// Answer of `GET /`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ServerInfo {
    pub title: String,
    pub version: String,
}

impl QdrantStore {
    #[inline]
    pub fn new(config: &VectorStoreConfig) -> Result<Self> {
        let base_url = config
            .qdrant_url()
            .map_err(|e| RagError::Config(format!("Failed to generate Qdrant URL: {}", e)))?;

        Ok(Self::with_url(base_url, config.timeout()))
    }

    #[inline]
    pub fn with_url(base_url: Url, timeout: Option<Duration>) -> Self {
        Self {
            client: JsonClient::new(base_url, Service::VectorStore, timeout),
        }
    }

    #[inline]
    pub fn base_url(&self) -> &Url {
        self.client.base_url()
    }

    /// Check the server is reachable and report its version.
    #[inline]
    pub fn server_info(&self) -> Result<ServerInfo> {
        let info: ServerInfo = self.client.get("/")?;
        debug!("Qdrant {} reachable at {}", info.version, self.base_url());
        Ok(info)
    }
}

impl VectorStore for QdrantStore {
    #[inline]
    fn collection_exists(&self, collection: &str) -> Result<bool> {
        let response: Envelope<ExistsResult> = self
            .client
            .get(&format!("/collections/{}/exists", collection))?;
        Ok(response.result.exists)
    }

    #[inline]
    fn create_collection(&self, collection: &str, params: &CollectionParams) -> Result<()> {
        let request = CreateCollectionRequest { vectors: params };
        let response: Envelope<bool> = self
            .client
            .put(&format!("/collections/{}", collection), &request)?;

        if !response.result {
            return Err(RagError::upstream(
                Service::VectorStore,
                format!("Qdrant refused to create collection `{}`", collection),
            ));
        }

        debug!("Qdrant acknowledged collection {}", collection);
        Ok(())
    }

    #[inline]
    fn upsert(&self, collection: &str, records: &[VectorRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let request = UpsertRequest { points: records };
        let response: Envelope<UpdateResult> = self.client.put(
            &format!("/collections/{}/points?wait=true", collection),
            &request,
        )?;

        debug!(
            "Upserted {} points into {} (status: {:?})",
            records.len(),
            collection,
            response.result.status
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
        let request = QueryRequest {
            query: vector,
            limit,
            with_payload,
        };
        let response: Envelope<QueryResult> = self.client.post(
            &format!("/collections/{}/points/query", collection),
            &request,
        )?;

        let mut points = response.result.points;
        // The server honours `limit`; this only guards the contract.
        points.truncate(limit);
        debug!("Query on {} returned {} points", collection, points.len());
        Ok(points)
    }

    #[inline]
    fn count(&self, collection: &str) -> Result<u64> {
        let response: Envelope<CountResult> = self.client.post(
            &format!("/collections/{}/points/count", collection),
            &CountRequest { exact: true },
        )?;
        Ok(response.result.count)
    }
}
