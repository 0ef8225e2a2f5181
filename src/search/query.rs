//! Engine-agnostic search request model
//!
//! Mirrors the subset of the Elasticsearch query DSL the catalog needs:
//! a bool query of `terms` and `fuzzy` leaves, a single field sort,
//! offset/limit pagination and `terms` aggregations.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sort order for search results
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[serde(rename = "asc")]
    Ascending,
    #[default]
    #[serde(rename = "desc")]
    Descending,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Ascending),
            "desc" => Ok(SortOrder::Descending),
            other => Err(AppError::malformed(
                "sortOrder",
                format!("expected 'asc' or 'desc', got '{}'", other),
            )),
        }
    }
}

/// Single-field sort
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSort {
    pub field: String,
    pub order: SortOrder,
}

impl FieldSort {
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }
}

/// Offset/limit window over the hit list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub from: u64,
    pub size: u64,
}

impl Pagination {
    /// Window for a zero-based page index
    pub fn for_page(page: u32, page_size: u32) -> Self {
        Self {
            from: u64::from(page) * u64::from(page_size),
            size: u64::from(page_size),
        }
    }
}

/// Leaf query clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Clause {
    /// Exact match of the field against any of the values
    Terms { field: String, values: Vec<String> },

    /// Approximate match within the engine's automatic edit distance
    Fuzzy { field: String, value: String },
}

impl Clause {
    pub fn terms(field: impl Into<String>, value: impl Into<String>) -> Self {
        Clause::Terms {
            field: field.into(),
            values: vec![value.into()],
        }
    }

    pub fn fuzzy(field: impl Into<String>, value: impl Into<String>) -> Self {
        Clause::Fuzzy {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn field(&self) -> &str {
        match self {
            Clause::Terms { field, .. } | Clause::Fuzzy { field, .. } => field,
        }
    }
}

/// Boolean combination of clauses.
///
/// Every `must` clause has to match. When there are no `must` clauses at
/// least one `should` clause has to match. An empty query matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoolQuery {
    pub must: Vec<Clause>,
    pub should: Vec<Clause>,
}

impl BoolQuery {
    pub fn match_all() -> Self {
        Self::default()
    }

    pub fn is_match_all(&self) -> bool {
        self.must.is_empty() && self.should.is_empty()
    }

    pub fn must(mut self, clause: Clause) -> Self {
        self.must.push(clause);
        self
    }

    pub fn should(mut self, clause: Clause) -> Self {
        self.should.push(clause);
        self
    }
}

/// Distinct-value bucket aggregation over one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermsAggregation {
    /// Name the buckets are reported under
    pub name: String,
    pub field: String,
    /// Maximum number of buckets
    pub size: usize,
}

impl TermsAggregation {
    pub fn new(name: impl Into<String>, field: impl Into<String>, size: usize) -> Self {
        Self {
            name: name.into(),
            field: field.into(),
            size,
        }
    }
}

/// Complete request handed to a [`SearchEngine`](super::SearchEngine)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: BoolQuery,
    pub sort: Option<FieldSort>,
    /// `None` leaves paging to the engine default
    pub pagination: Option<Pagination>,
    pub aggregations: Vec<TermsAggregation>,
}

impl SearchRequest {
    pub fn new(query: BoolQuery) -> Self {
        Self {
            query,
            ..Default::default()
        }
    }

    pub fn with_sort(mut self, sort: FieldSort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    pub fn with_aggregation(mut self, aggregation: TermsAggregation) -> Self {
        self.aggregations.push(aggregation);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_order_parsing_is_case_insensitive() {
        assert_eq!("asc".parse::<SortOrder>().unwrap(), SortOrder::Ascending);
        assert_eq!("DESC".parse::<SortOrder>().unwrap(), SortOrder::Descending);
        assert_eq!("Asc".parse::<SortOrder>().unwrap(), SortOrder::Ascending);
    }

    #[test]
    fn test_unknown_sort_order_is_malformed() {
        let err = "sideways".parse::<SortOrder>().unwrap_err();
        assert_eq!(err.error_code(), "MALFORMED_PARAMETER");
        assert!(err.to_string().contains("sortOrder"));
    }

    #[test]
    fn test_pagination_window() {
        let window = Pagination::for_page(3, 25);
        assert_eq!(window.from, 75);
        assert_eq!(window.size, 25);
    }

    #[test]
    fn test_search_request_builder() {
        let request = SearchRequest::new(BoolQuery::match_all().must(Clause::terms("size", "158W")))
            .with_sort(FieldSort::new("year", SortOrder::Ascending))
            .with_pagination(Pagination::for_page(0, 10))
            .with_aggregation(TermsAggregation::new("size", "size", 100));

        assert_eq!(request.query.must.len(), 1);
        assert_eq!(request.query.must[0].field(), "size");
        assert_eq!(request.sort.unwrap().order, SortOrder::Ascending);
        assert_eq!(request.aggregations.len(), 1);
    }

    #[test]
    fn test_empty_bool_matches_all() {
        assert!(BoolQuery::match_all().is_match_all());
        assert!(!BoolQuery::match_all().should(Clause::fuzzy("name", "orca")).is_match_all());
    }
}
