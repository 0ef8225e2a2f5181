//! Elasticsearch REST backend

use crate::config::EngineConfig;
use crate::search::engine::{Bucket, BucketGroup, Hit, SearchEngine, SearchHits};
use crate::search::error::{EngineError, EngineResult};
use crate::search::query::{BoolQuery, Clause, SearchRequest};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;

/// Search engine backed by an Elasticsearch cluster
#[derive(Clone)]
pub struct ElasticsearchEngine {
    client: Client,
    base_url: String,
    index: String,
    refresh: bool,
}

#[derive(Debug, Deserialize)]
struct WriteResponse {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    result: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GetResponse {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    found: bool,
    #[serde(rename = "_source", default)]
    source: Value,
}

#[derive(Debug, Deserialize)]
struct UpdateResponse {
    #[serde(rename = "_id")]
    id: String,
    get: Option<UpdateGetResult>,
}

#[derive(Debug, Deserialize)]
struct UpdateGetResult {
    #[serde(rename = "_source", default)]
    source: Value,
}

#[derive(Debug, Deserialize)]
struct DeleteByQueryResponse {
    #[serde(default)]
    deleted: u64,
}

#[derive(Debug, Deserialize)]
struct BulkResponse {
    errors: bool,
    #[serde(default)]
    items: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: HitsEnvelope,
    #[serde(default)]
    aggregations: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct HitsEnvelope {
    total: TotalHits,
    #[serde(default)]
    hits: Vec<RawHit>,
}

/// `hits.total` is a bare number before 7.0 and an object since
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TotalHits {
    Count(u64),
    Object { value: u64 },
}

impl TotalHits {
    fn value(&self) -> u64 {
        match self {
            TotalHits::Count(count) => *count,
            TotalHits::Object { value } => *value,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawHit {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_source", default)]
    source: Value,
}

#[derive(Debug, Deserialize)]
struct TermsAggregationResult {
    #[serde(default)]
    buckets: Vec<RawBucket>,
}

#[derive(Debug, Deserialize)]
struct RawBucket {
    key: Value,
    key_as_string: Option<String>,
    doc_count: u64,
}

impl RawBucket {
    fn into_bucket(self) -> Bucket {
        let key = match (self.key_as_string, self.key) {
            (Some(key), _) => key,
            (None, Value::String(key)) => key,
            (None, other) => other.to_string(),
        };
        Bucket {
            key,
            doc_count: self.doc_count,
        }
    }
}

impl ElasticsearchEngine {
    /// Create a new engine client
    pub fn new(config: &EngineConfig) -> EngineResult<Self> {
        if config.index.is_empty() {
            return Err(EngineError::InvalidConfiguration(
                "engine.index must not be empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                EngineError::InvalidConfiguration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            index: config.index.clone(),
            refresh: config.refresh,
        })
    }

    fn index_url(&self, suffix: &str) -> String {
        format!("{}/{}{}", self.base_url, self.index, suffix)
    }

    fn doc_url(&self, endpoint: &str, id: &str) -> String {
        self.index_url(&format!("/{}/{}", endpoint, urlencoding::encode(id)))
    }

    fn refresh_param(&self) -> &'static str {
        if self.refresh {
            "wait_for"
        } else {
            "false"
        }
    }

    /// Create the index with the catalog mapping unless it already exists
    pub async fn ensure_index(&self) -> EngineResult<bool> {
        let response = self.client.head(self.index_url("")).send().await?;
        if response.status().is_success() {
            return Ok(false);
        }
        if response.status() != StatusCode::NOT_FOUND {
            return Err(EngineError::IndexInitFailed(format!(
                "unexpected status {} probing index {}",
                response.status(),
                self.index
            )));
        }

        let response = self
            .client
            .put(self.index_url(""))
            .json(&index_mapping())
            .send()
            .await?;
        check(response, EngineError::IndexInitFailed).await?;

        tracing::info!(index = %self.index, "Created search index");
        Ok(true)
    }
}

#[async_trait]
impl SearchEngine for ElasticsearchEngine {
    async fn index_document(&self, id: &str, source: &Value) -> EngineResult<String> {
        let response = self
            .client
            .put(self.doc_url("_doc", id))
            .query(&[("refresh", self.refresh_param())])
            .json(source)
            .send()
            .await?;
        let written: WriteResponse = check(response, EngineError::IndexingFailed)
            .await?
            .json()
            .await?;

        tracing::debug!(board_id = %written.id, result = ?written.result, "Document indexed");
        Ok(written.id)
    }

    async fn get_document(&self, id: &str) -> EngineResult<Option<Hit>> {
        let response = self.client.get(self.doc_url("_doc", id)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let found: GetResponse = check(response, EngineError::SearchFailed)
            .await?
            .json()
            .await?;

        Ok(found.found.then(|| Hit {
            id: found.id,
            source: found.source,
        }))
    }

    async fn update_document(&self, id: &str, partial: &Value) -> EngineResult<Hit> {
        let response = self
            .client
            .post(self.doc_url("_update", id))
            .query(&[("refresh", self.refresh_param()), ("_source", "true")])
            .json(&json!({ "doc": partial }))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(EngineError::DocumentNotFound(id.to_string()));
        }
        let updated: UpdateResponse = check(response, EngineError::UpdateFailed)
            .await?
            .json()
            .await?;

        let source = updated.get.map(|get| get.source).ok_or_else(|| {
            EngineError::UnexpectedResponse(format!("update of {} returned no document", id))
        })?;
        Ok(Hit {
            id: updated.id,
            source,
        })
    }

    async fn delete_document(&self, id: &str) -> EngineResult<bool> {
        let response = self
            .client
            .delete(self.doc_url("_doc", id))
            .query(&[("refresh", self.refresh_param())])
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        let deleted: WriteResponse = check(response, EngineError::DeletionFailed)
            .await?
            .json()
            .await?;

        Ok(deleted.result.as_deref() == Some("deleted"))
    }

    async fn delete_all(&self) -> EngineResult<u64> {
        let response = self
            .client
            .post(self.index_url("/_delete_by_query"))
            .query(&[("refresh", "true"), ("conflicts", "proceed")])
            .json(&json!({ "query": { "match_all": {} } }))
            .send()
            .await?;
        // No index means nothing to delete.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(0);
        }
        let deleted: DeleteByQueryResponse = check(response, EngineError::DeletionFailed)
            .await?
            .json()
            .await?;

        Ok(deleted.deleted)
    }

    async fn search(&self, request: &SearchRequest) -> EngineResult<SearchHits> {
        let body = search_body(request);
        tracing::debug!(query = %body, "Executing search");

        let response = self
            .client
            .post(self.index_url("/_search"))
            .json(&body)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(EngineError::IndexNotFound(self.index.clone()));
        }
        let mut result: SearchResponse = check(response, EngineError::SearchFailed)
            .await?
            .json()
            .await?;

        let mut aggregations = Vec::with_capacity(request.aggregations.len());
        for aggregation in &request.aggregations {
            let raw = result.aggregations.remove(&aggregation.name).ok_or_else(|| {
                EngineError::UnexpectedResponse(format!(
                    "missing aggregation '{}'",
                    aggregation.name
                ))
            })?;
            let terms: TermsAggregationResult = serde_json::from_value(raw)?;
            aggregations.push(BucketGroup {
                name: aggregation.name.clone(),
                buckets: terms.buckets.into_iter().map(RawBucket::into_bucket).collect(),
            });
        }

        Ok(SearchHits {
            total: result.hits.total.value(),
            hits: result
                .hits
                .hits
                .into_iter()
                .map(|hit| Hit {
                    id: hit.id,
                    source: hit.source,
                })
                .collect(),
            aggregations,
        })
    }

    async fn bulk_index(&self, documents: &[(String, Value)]) -> EngineResult<usize> {
        if documents.is_empty() {
            return Ok(0);
        }

        let body = bulk_body(&self.index, documents)?;
        let response = self
            .client
            .post(format!("{}/_bulk", self.base_url))
            .query(&[("refresh", self.refresh_param())])
            .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
            .body(body)
            .send()
            .await?;
        let bulk: BulkResponse = check(response, EngineError::IndexingFailed)
            .await?
            .json()
            .await?;

        if bulk.errors {
            let first_error = bulk
                .items
                .iter()
                .find_map(|item| item.get("index").and_then(|op| op.get("error")))
                .map(Value::to_string)
                .unwrap_or_else(|| "unknown bulk error".to_string());
            return Err(EngineError::IndexingFailed(first_error));
        }

        Ok(documents.len())
    }

    fn name(&self) -> &'static str {
        "elasticsearch"
    }
}

/// Pass successful responses through, turn the rest into `on_error`
async fn check(response: Response, on_error: fn(String) -> EngineError) -> EngineResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(on_error(format!("status {}: {}", status.as_u16(), body)))
}

fn clause_json(clause: &Clause) -> Value {
    match clause {
        Clause::Terms { field, values } => json!({ "terms": { field.as_str(): values } }),
        Clause::Fuzzy { field, value } => json!({
            "fuzzy": { field.as_str(): { "value": value, "fuzziness": "AUTO" } }
        }),
    }
}

pub(crate) fn query_json(query: &BoolQuery) -> Value {
    if query.is_match_all() {
        return json!({ "match_all": {} });
    }

    let mut bool_query = Map::new();
    if !query.must.is_empty() {
        bool_query.insert(
            "must".to_string(),
            Value::Array(query.must.iter().map(clause_json).collect()),
        );
    }
    if !query.should.is_empty() {
        bool_query.insert(
            "should".to_string(),
            Value::Array(query.should.iter().map(clause_json).collect()),
        );
    }
    json!({ "bool": bool_query })
}

/// Request body for `_search`
pub(crate) fn search_body(request: &SearchRequest) -> Value {
    let mut body = Map::new();
    body.insert("query".to_string(), query_json(&request.query));
    body.insert("track_total_hits".to_string(), Value::Bool(true));

    if let Some(sort) = &request.sort {
        body.insert(
            "sort".to_string(),
            json!([{ sort.field.as_str(): { "order": sort.order.as_str() } }]),
        );
    }

    if let Some(window) = request.pagination {
        body.insert("from".to_string(), json!(window.from));
        body.insert("size".to_string(), json!(window.size));
    }

    if !request.aggregations.is_empty() {
        let aggs: Map<String, Value> = request
            .aggregations
            .iter()
            .map(|agg| {
                (
                    agg.name.clone(),
                    json!({ "terms": { "field": agg.field, "size": agg.size } }),
                )
            })
            .collect();
        body.insert("aggs".to_string(), Value::Object(aggs));
    }

    Value::Object(body)
}

/// NDJSON body for `_bulk`
fn bulk_body(index: &str, documents: &[(String, Value)]) -> EngineResult<String> {
    let mut body = String::new();
    for (id, source) in documents {
        body.push_str(&serde_json::to_string(
            &json!({ "index": { "_index": index, "_id": id } }),
        )?);
        body.push('\n');
        body.push_str(&serde_json::to_string(source)?);
        body.push('\n');
    }
    Ok(body)
}

/// Index mapping: facet fields are keywords, prose fields are analyzed text
pub fn index_mapping() -> Value {
    let keyword_with_text = json!({
        "type": "text",
        "fields": { "keyword": { "type": "keyword", "ignore_above": 256 } }
    });

    json!({
        "mappings": {
            "properties": {
                "year": { "type": "integer" },
                "name": keyword_with_text,
                "code": { "type": "keyword" },
                "size": { "type": "keyword" },
                "terrain": { "type": "keyword" },
                "ridingLevel": { "type": "keyword" },
                "bend": { "type": "keyword" },
                "shape": { "type": "keyword" },
                "details": { "type": "text" },
                "spec": {
                    "properties": {
                        "contactLength": { "type": "integer" },
                        "sideCut": { "type": "double" },
                        "noseWidth": { "type": "double" },
                        "tailWidth": { "type": "double" },
                        "waistWidth": { "type": "double" },
                        "flex": { "type": "integer" },
                        "weightRange": { "type": "integer" },
                        "stance": {
                            "properties": {
                                "min": { "type": "double" },
                                "max": { "type": "double" },
                                "setBack": { "type": "double" }
                            }
                        }
                    }
                },
                "features": {
                    "properties": {
                        "type": { "type": "keyword" },
                        "name": { "type": "keyword" },
                        "description": { "type": "text" }
                    }
                }
            }
        }
    })
}
