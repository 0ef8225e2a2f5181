//! Search engine access for the board catalog
//!
//! The catalog never talks to a search engine directly. It builds an
//! engine-agnostic [`SearchRequest`] and hands it to a [`SearchEngine`]:
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │           SearchEngine trait                     │
//! ├─────────────────────────────────────────────────┤
//! │  - index_document()  - get_document()           │
//! │  - update_document() - delete_document()        │
//! │  - delete_all()      - search()  - bulk_index() │
//! └─────────────────────────────────────────────────┘
//!            │                          │
//!            ▼                          ▼
//! ┌──────────────────────┐   ┌──────────────────────┐
//! │ ElasticsearchEngine  │   │   InMemoryEngine     │
//! │ REST + query DSL     │   │ DashMap evaluator    │
//! └──────────────────────┘   └──────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use board_catalog::search::{
//!     BoolQuery, Clause, InMemoryEngine, SearchEngine, SearchRequest, TermsAggregation,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = InMemoryEngine::new();
//!
//!     let request = SearchRequest::new(BoolQuery::match_all().must(Clause::terms("size", "158W")))
//!         .with_aggregation(TermsAggregation::new("terrain", "terrain", 100));
//!
//!     let result = engine.search(&request).await?;
//!     println!("Found {} boards", result.total);
//!
//!     Ok(())
//! }
//! ```

mod elasticsearch;
mod engine;
mod error;
mod factory;
mod memory;
mod query;

pub use elasticsearch::{index_mapping, ElasticsearchEngine};
pub use engine::{Bucket, BucketGroup, Hit, SearchEngine, SearchHits};
pub use error::{EngineError, EngineResult};
pub use factory::{create_engine, create_in_memory_engine};
pub use memory::InMemoryEngine;
pub use query::{
    BoolQuery, Clause, FieldSort, Pagination, SearchRequest, SortOrder, TermsAggregation,
};
