use crate::config::{EngineBackend, EngineConfig};
use crate::error::Result;
use crate::search::{ElasticsearchEngine, InMemoryEngine, SearchEngine};
use std::sync::Arc;

/// Create a search engine based on configuration
pub async fn create_engine(config: &EngineConfig) -> Result<Arc<dyn SearchEngine>> {
    match config.backend {
        EngineBackend::Elasticsearch => {
            tracing::info!(
                url = %config.url,
                index = %config.index,
                "Initializing Elasticsearch backend"
            );

            let engine = ElasticsearchEngine::new(config)?;
            match engine.ensure_index().await {
                Ok(true) => tracing::info!(index = %config.index, "Index created with catalog mapping"),
                Ok(false) => tracing::debug!(index = %config.index, "Index already exists"),
                Err(e) => {
                    tracing::warn!(error = %e, "Could not verify search index");
                    tracing::warn!("Continuing; requests will fail until the cluster is reachable");
                }
            }
            Ok(Arc::new(engine))
        }

        EngineBackend::InMemory => {
            tracing::warn!("Using in-memory search engine; data is lost on restart");
            Ok(create_in_memory_engine())
        }
    }
}

/// Create an in-memory engine (for testing)
pub fn create_in_memory_engine() -> Arc<dyn SearchEngine> {
    Arc::new(InMemoryEngine::new())
}
