//! Board catalog service: CRUD plus faceted and fuzzy search over a search engine

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod models;
pub mod search;

pub use error::{AppError, Result};
