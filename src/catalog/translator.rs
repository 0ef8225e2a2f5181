//! Builds engine search requests from validated request values

use crate::catalog::params::{FilterSelection, PageParameters};
use crate::config::CatalogConfig;
use crate::search::{BoolQuery, Clause, Pagination, SearchRequest, TermsAggregation};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct QueryTranslator {
    config: Arc<CatalogConfig>,
}

impl QueryTranslator {
    pub fn new(config: Arc<CatalogConfig>) -> Self {
        Self { config }
    }

    /// Listing filtered by exact facet values (AND), with every facet aggregated
    pub fn filter_request(&self, page: &PageParameters, selection: &FilterSelection) -> SearchRequest {
        let query = selection
            .iter()
            .filter(|(name, _)| self.config.is_filter(name))
            .fold(BoolQuery::match_all(), |query, (name, value)| {
                query.must(Clause::terms(name, value))
            });

        self.with_facets(self.paged(SearchRequest::new(query), page))
    }

    /// Free-text search: a fuzzy match on any searchable field (OR), no facets
    pub fn search_request(&self, page: &PageParameters, text: &str) -> SearchRequest {
        let query = self
            .config
            .search_fields
            .iter()
            .fold(BoolQuery::match_all(), |query, field| {
                query.should(Clause::fuzzy(field, text))
            });

        self.paged(SearchRequest::new(query), page)
    }

    /// Match-all request used only to enumerate facet values
    pub fn filters_request(&self) -> SearchRequest {
        self.with_facets(
            SearchRequest::new(BoolQuery::match_all()).with_pagination(Pagination { from: 0, size: 0 }),
        )
    }

    fn paged(&self, request: SearchRequest, page: &PageParameters) -> SearchRequest {
        request.with_sort(page.sort()).with_pagination(page.pagination())
    }

    fn with_facets(&self, request: SearchRequest) -> SearchRequest {
        self.config.filter_names.iter().fold(request, |request, name| {
            request.with_aggregation(TermsAggregation::new(name, name, self.config.facet_size))
        })
    }
}
