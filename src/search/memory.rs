//! In-process search engine (for local runs and testing)

use crate::search::engine::{Bucket, BucketGroup, Hit, SearchEngine, SearchHits};
use crate::search::error::{EngineError, EngineResult};
use crate::search::query::{BoolQuery, Clause, FieldSort, SearchRequest, SortOrder};
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

/// Fields indexed as `text`; every other field is matched as a whole keyword
const ANALYZED_FIELDS: &[&str] = &["name", "details", "features.description"];

/// In-memory document store evaluating the catalog query model
#[derive(Clone, Default)]
pub struct InMemoryEngine {
    documents: Arc<DashMap<String, Value>>,
}

impl InMemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn matching(&self, query: &BoolQuery) -> Vec<Hit> {
        self.documents
            .iter()
            .filter(|entry| matches_query(query, entry.value()))
            .map(|entry| Hit {
                id: entry.key().clone(),
                source: entry.value().clone(),
            })
            .collect()
    }
}

#[async_trait]
impl SearchEngine for InMemoryEngine {
    async fn index_document(&self, id: &str, source: &Value) -> EngineResult<String> {
        if !source.is_object() {
            return Err(EngineError::IndexingFailed(format!(
                "document {} is not a JSON object",
                id
            )));
        }
        self.documents.insert(id.to_string(), source.clone());
        tracing::debug!(board_id = %id, "Document indexed");
        Ok(id.to_string())
    }

    async fn get_document(&self, id: &str) -> EngineResult<Option<Hit>> {
        Ok(self.documents.get(id).map(|entry| Hit {
            id: id.to_string(),
            source: entry.value().clone(),
        }))
    }

    async fn update_document(&self, id: &str, partial: &Value) -> EngineResult<Hit> {
        let mut entry = self
            .documents
            .get_mut(id)
            .ok_or_else(|| EngineError::DocumentNotFound(id.to_string()))?;
        merge(entry.value_mut(), partial);
        tracing::debug!(board_id = %id, "Document updated");
        Ok(Hit {
            id: id.to_string(),
            source: entry.value().clone(),
        })
    }

    async fn delete_document(&self, id: &str) -> EngineResult<bool> {
        Ok(self.documents.remove(id).is_some())
    }

    async fn delete_all(&self) -> EngineResult<u64> {
        let deleted = self.documents.len() as u64;
        self.documents.clear();
        Ok(deleted)
    }

    async fn search(&self, request: &SearchRequest) -> EngineResult<SearchHits> {
        let mut hits = self.matching(&request.query);
        let total = hits.len() as u64;

        let aggregations = request
            .aggregations
            .iter()
            .map(|aggregation| BucketGroup {
                name: aggregation.name.clone(),
                buckets: terms_buckets(&hits, &aggregation.field, aggregation.size),
            })
            .collect();

        // Ties fall back to id order so paging is stable.
        hits.sort_by(|a, b| a.id.cmp(&b.id));
        if let Some(sort) = &request.sort {
            hits.sort_by(|a, b| compare_by(sort, a, b));
        }

        if let Some(window) = request.pagination {
            hits = hits
                .into_iter()
                .skip(window.from as usize)
                .take(window.size as usize)
                .collect();
        }

        Ok(SearchHits {
            hits,
            total,
            aggregations,
        })
    }

    async fn bulk_index(&self, documents: &[(String, Value)]) -> EngineResult<usize> {
        for (id, source) in documents {
            self.documents.insert(id.clone(), source.clone());
        }
        tracing::debug!(count = documents.len(), "Bulk indexed documents");
        Ok(documents.len())
    }

    fn name(&self) -> &'static str {
        "in_memory"
    }
}

/// Values at a dotted path, flattening arrays along the way
fn field_values<'a>(document: &'a Value, path: &str) -> Vec<&'a Value> {
    let mut current = vec![document];
    for segment in path.split('.') {
        current = current
            .into_iter()
            .flat_map(|value| match value {
                Value::Array(items) => items.iter().collect::<Vec<_>>(),
                other => vec![other],
            })
            .filter_map(|value| value.get(segment))
            .collect();
    }
    current
        .into_iter()
        .flat_map(|value| match value {
            Value::Array(items) => items.iter().collect::<Vec<_>>(),
            other => vec![other],
        })
        .filter(|value| !value.is_null())
        .collect()
}

/// The term a scalar is indexed under
fn term(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn matches_query(query: &BoolQuery, document: &Value) -> bool {
    if !query.must.iter().all(|clause| matches_clause(clause, document)) {
        return false;
    }
    if query.must.is_empty() && !query.should.is_empty() {
        return query.should.iter().any(|clause| matches_clause(clause, document));
    }
    true
}

fn matches_clause(clause: &Clause, document: &Value) -> bool {
    match clause {
        Clause::Terms { field, values } => field_values(document, field)
            .into_iter()
            .filter_map(term)
            .any(|indexed| values.iter().any(|v| *v == indexed)),
        Clause::Fuzzy { field, value } => {
            let max_edits = auto_fuzziness(value);
            let analyzed = ANALYZED_FIELDS.contains(&field.as_str());
            field_values(document, field)
                .into_iter()
                .filter_map(term)
                .any(|indexed| {
                    if analyzed {
                        // the query term is not analyzed, only the indexed tokens are
                        analyze(&indexed).any(|token| levenshtein(&token, value) <= max_edits)
                    } else {
                        levenshtein(&indexed, value) <= max_edits
                    }
                })
        }
    }
}

/// Standard-analyzer approximation: lowercase alphanumeric tokens
fn analyze(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
}

/// Edit distance allowed for a term of this length (Elasticsearch `AUTO`)
fn auto_fuzziness(term: &str) -> usize {
    match term.chars().count() {
        0..=2 => 0,
        3..=5 => 1,
        _ => 2,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != *cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

/// Missing values sort last in both directions
fn compare_by(sort: &FieldSort, a: &Hit, b: &Hit) -> Ordering {
    let left = field_values(&a.source, &sort.field).into_iter().next();
    let right = field_values(&b.source, &sort.field).into_iter().next();

    match (left, right) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(l), Some(r)) => {
            let ordering = compare_values(l, r);
            match sort.order {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            }
        }
    }
}

fn compare_values(left: &Value, right: &Value) -> Ordering {
    match (left.as_f64(), right.as_f64()) {
        (Some(l), Some(r)) => l.partial_cmp(&r).unwrap_or(Ordering::Equal),
        _ => term(left).cmp(&term(right)),
    }
}

/// Distinct-value counts, largest first, then by key
fn terms_buckets(hits: &[Hit], field: &str, size: usize) -> Vec<Bucket> {
    let mut counts: HashMap<String, u64> = HashMap::new();
    for hit in hits {
        let mut seen: Vec<String> = field_values(&hit.source, field)
            .into_iter()
            .filter_map(term)
            .collect();
        seen.sort();
        seen.dedup();
        for key in seen {
            *counts.entry(key).or_insert(0) += 1;
        }
    }

    let mut buckets: Vec<Bucket> = counts
        .into_iter()
        .map(|(key, doc_count)| Bucket { key, doc_count })
        .collect();
    buckets.sort_by(|a, b| b.doc_count.cmp(&a.doc_count).then_with(|| a.key.cmp(&b.key)));
    buckets.truncate(size);
    buckets
}

/// Recursive partial-document merge: objects merge, everything else replaces
fn merge(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                match target.get_mut(key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        merge(existing, value)
                    }
                    _ => {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, patch) => *target = patch.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::query::{Pagination, TermsAggregation};
    use serde_json::json;

    async fn seeded_engine() -> InMemoryEngine {
        let engine = InMemoryEngine::new();
        let docs = vec![
            ("a".to_string(), json!({"year": 2012, "size": "158W", "name": "Orca", "terrain": "Powder"})),
            ("b".to_string(), json!({"year": 2018, "size": "154", "name": "Lynx", "terrain": "Park"})),
            ("c".to_string(), json!({"year": 2015, "size": "158W", "name": "Otter", "terrain": "Park"})),
        ];
        engine.bulk_index(&docs).await.unwrap();
        engine
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("orca", "orca"), 0);
        assert_eq!(levenshtein("", "abc"), 3);
    }

    #[test]
    fn test_auto_fuzziness() {
        assert_eq!(auto_fuzziness("ab"), 0);
        assert_eq!(auto_fuzziness("orca"), 1);
        assert_eq!(auto_fuzziness("beginner"), 2);
    }

    #[test]
    fn test_field_values_walks_nested_arrays() {
        let doc = json!({"spec": {"stance": {"min": 19.5}}, "features": [{"name": "x"}, {"name": "y"}]});
        assert_eq!(field_values(&doc, "spec.stance.min"), vec![&json!(19.5)]);
        assert_eq!(field_values(&doc, "features.name").len(), 2);
        assert!(field_values(&doc, "missing").is_empty());
    }

    #[test]
    fn test_merge_is_recursive_for_objects() {
        let mut doc = json!({"year": 2012, "spec": {"flex": 3, "sideCut": 7.5}, "features": [1, 2]});
        merge(&mut doc, &json!({"spec": {"flex": 8}, "features": [3]}));
        assert_eq!(doc, json!({"year": 2012, "spec": {"flex": 8, "sideCut": 7.5}, "features": [3]}));
    }

    #[tokio::test]
    async fn test_terms_numbers_match_string_values() {
        let engine = seeded_engine().await;
        let request = SearchRequest::new(BoolQuery::match_all().must(Clause::terms("year", "2018")));
        let result = engine.search(&request).await.unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.hits[0].id, "b");
    }

    #[tokio::test]
    async fn test_should_matches_any_fuzzy_clause() {
        let engine = seeded_engine().await;
        let query = BoolQuery::match_all()
            .should(Clause::fuzzy("name", "orka"))
            .should(Clause::fuzzy("terrain", "Powdr"));
        let result = engine.search(&SearchRequest::new(query)).await.unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.hits[0].id, "a");
    }

    #[tokio::test]
    async fn test_fuzzy_keyword_fields_are_case_sensitive() {
        let engine = seeded_engine().await;
        let search = |field: &str, value: &str| {
            SearchRequest::new(BoolQuery::match_all().should(Clause::fuzzy(field, value)))
        };

        assert_eq!(engine.search(&search("terrain", "PARK")).await.unwrap().total, 0);
        assert_eq!(engine.search(&search("terrain", "Park")).await.unwrap().total, 2);
        assert_eq!(engine.search(&search("terrain", "powdr")).await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn test_fuzzy_text_fields_match_lowercased_tokens() {
        let engine = InMemoryEngine::new();
        engine
            .index_document("d", &json!({"name": "Orca", "details": "Thus with a kiss I die."}))
            .await
            .unwrap();
        let search = |field: &str, value: &str| {
            SearchRequest::new(BoolQuery::match_all().should(Clause::fuzzy(field, value)))
        };

        assert_eq!(engine.search(&search("name", "orka")).await.unwrap().total, 1);
        assert_eq!(engine.search(&search("name", "ORCA")).await.unwrap().total, 0);
        assert_eq!(engine.search(&search("details", "kis")).await.unwrap().total, 1);
    }

    #[tokio::test]
    async fn test_sort_paginate_and_aggregate() {
        let engine = seeded_engine().await;
        let request = SearchRequest::new(BoolQuery::match_all())
            .with_sort(FieldSort::new("year", SortOrder::Descending))
            .with_pagination(Pagination { from: 1, size: 1 })
            .with_aggregation(TermsAggregation::new("size", "size", 100));

        let result = engine.search(&request).await.unwrap();
        assert_eq!(result.total, 3);
        assert_eq!(result.hits.len(), 1);
        assert_eq!(result.hits[0].id, "c");

        let sizes = &result.aggregations[0];
        assert_eq!(sizes.name, "size");
        assert_eq!(
            sizes.buckets,
            vec![
                Bucket { key: "158W".to_string(), doc_count: 2 },
                Bucket { key: "154".to_string(), doc_count: 1 },
            ]
        );
    }

    #[tokio::test]
    async fn test_update_missing_document_fails() {
        let engine = InMemoryEngine::new();
        let err = engine.update_document("nope", &json!({"year": 2020})).await.unwrap_err();
        assert!(matches!(err, EngineError::DocumentNotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_reports_match() {
        let engine = seeded_engine().await;
        assert!(engine.delete_document("a").await.unwrap());
        assert!(!engine.delete_document("a").await.unwrap());
        assert_eq!(engine.delete_all().await.unwrap(), 2);
        assert!(engine.is_empty());
    }
}
