pub mod handlers;
pub mod routes;

pub use routes::*;

use crate::catalog::CatalogService;
use crate::config::ServerConfig;
use std::sync::Arc;
use std::time::Duration;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,

    /// Requests still running after this are answered with 408
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(catalog: Arc<CatalogService>) -> Self {
        Self {
            catalog,
            request_timeout: Duration::from_secs(ServerConfig::default().request_timeout_secs),
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
