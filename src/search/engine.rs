//! Search engine capability interface

use crate::search::error::EngineResult;
use crate::search::query::SearchRequest;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A stored document as returned by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    pub id: String,
    pub source: Value,
}

/// One distinct value of an aggregated field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub key: String,
    pub doc_count: u64,
}

/// Buckets of one named aggregation, in engine order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketGroup {
    pub name: String,
    pub buckets: Vec<Bucket>,
}

/// Raw result of a search call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchHits {
    /// Hits inside the requested window, in engine order
    pub hits: Vec<Hit>,

    /// Total matches before pagination
    pub total: u64,

    /// One group per requested aggregation, in request order
    pub aggregations: Vec<BucketGroup>,
}

/// Operations the catalog needs from a document search engine.
///
/// Implementations own persistence, ranking, pagination and aggregation;
/// callers only build [`SearchRequest`]s and shape the results.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Store a document under `id`, replacing any previous version
    async fn index_document(&self, id: &str, source: &Value) -> EngineResult<String>;

    /// Fetch a document by id
    async fn get_document(&self, id: &str) -> EngineResult<Option<Hit>>;

    /// Merge `partial` into the stored document and return the result.
    ///
    /// Fails with [`EngineError::DocumentNotFound`](super::EngineError::DocumentNotFound)
    /// when `id` does not exist.
    async fn update_document(&self, id: &str, partial: &Value) -> EngineResult<Hit>;

    /// Delete a document; `false` when nothing matched `id`
    async fn delete_document(&self, id: &str) -> EngineResult<bool>;

    /// Delete every document in the index, returning how many were removed
    async fn delete_all(&self) -> EngineResult<u64>;

    /// Run a query with sort, pagination and aggregations
    async fn search(&self, request: &SearchRequest) -> EngineResult<SearchHits>;

    /// Store many documents in one call
    async fn bulk_index(&self, documents: &[(String, Value)]) -> EngineResult<usize>;

    /// Backend name for logs and health output
    fn name(&self) -> &'static str;
}
