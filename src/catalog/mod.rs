//! Board catalog: request validation, query translation and response shaping
//!
//! A list request flows through the pieces in order:
//!
//! ```text
//! params ──► RequestValidator ──► PageParameters / FilterSelection
//!                                        │
//!                                        ▼
//!                                 QueryTranslator ──► SearchEngine
//!                                                          │
//!                                                          ▼
//!                                  BoardPage ◄── assembler
//! ```

pub mod assembler;
pub mod params;
pub mod service;
pub mod translator;
pub mod validator;

pub use assembler::{BoardFilter, BoardPage, FacetValues};
pub use params::{FilterSelection, PageParameters};
pub use service::CatalogService;
pub use translator::QueryTranslator;
pub use validator::RequestValidator;

/// Query parameter carrying free-text search input
pub const FREE_TEXT_KEY: &str = "q";
