use crate::catalog::assembler::{self, BoardFilter, BoardPage};
use crate::catalog::params::{FilterSelection, PageParameters};
use crate::catalog::translator::QueryTranslator;
use crate::catalog::validator::RequestValidator;
use crate::catalog::FREE_TEXT_KEY;
use crate::config::CatalogConfig;
use crate::error::{AppError, Result};
use crate::fixtures::BoardGenerator;
use crate::models::Board;
use crate::search::SearchEngine;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Validate)]
struct SeedRequest {
    #[validate(range(min = 1))]
    num: u32,
}

/// Board catalog operations on top of a search engine
pub struct CatalogService {
    engine: Arc<dyn SearchEngine>,
    config: Arc<CatalogConfig>,
    validator: RequestValidator,
    translator: QueryTranslator,
    generator: BoardGenerator,
}

impl CatalogService {
    pub fn new(engine: Arc<dyn SearchEngine>, config: CatalogConfig, generator: BoardGenerator) -> Self {
        let config = Arc::new(config);
        Self {
            engine,
            validator: RequestValidator::new(config.clone()),
            translator: QueryTranslator::new(config.clone()),
            config,
            generator,
        }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Name of the backing engine
    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    /// Store a board, generating an id when none is given
    pub async fn create(&self, mut board: Board) -> Result<String> {
        let id = match board.id.take().filter(|id| !id.trim().is_empty()) {
            Some(id) => id,
            None => Uuid::new_v4().to_string(),
        };

        let source = board.source()?;
        let id = self.engine.index_document(&id, &source).await?;

        tracing::info!(board_id = %id, name = %board.name, "Board created");
        Ok(id)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Board>> {
        tracing::debug!(board_id = %id, "Fetching board");

        match self.engine.get_document(id).await? {
            Some(hit) => Ok(Some(assembler::board_from_hit(hit)?)),
            None => Ok(None),
        }
    }

    /// Merge a partial document into an existing board and return the result
    pub async fn update(&self, id: &str, partial: Value) -> Result<Board> {
        let mut partial = match partial {
            Value::Object(fields) => fields,
            other => {
                return Err(AppError::Validation(format!(
                    "update body must be a JSON object, got {}",
                    json_kind(&other)
                )))
            }
        };
        partial.remove("id");
        let fields: Vec<String> = partial.keys().cloned().collect();

        // every Board field defaults, so this only rejects wrongly typed values
        let partial = Value::Object(partial);
        serde_json::from_value::<Board>(partial.clone())
            .map_err(|e| AppError::Validation(format!("update body does not fit a board: {}", e)))?;

        let hit = self.engine.update_document(id, &partial).await?;

        tracing::info!(board_id = %id, fields = ?fields, "Board updated");
        assembler::board_from_hit(hit)
    }

    /// `false` when no board had this id
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let deleted = self.engine.delete_document(id).await?;
        tracing::info!(board_id = %id, deleted, "Board delete requested");
        Ok(deleted)
    }

    pub async fn delete_all(&self) -> Result<bool> {
        let deleted = self.engine.delete_all().await?;
        tracing::info!(deleted, "All boards deleted");
        Ok(true)
    }

    /// Generate `num` random boards and write them in one bulk call
    pub async fn seed(&self, num: u32) -> Result<bool> {
        SeedRequest { num }.validate()?;
        if num > self.config.max_seed_batch {
            return Err(AppError::Validation(format!(
                "num: at most {} boards can be generated at once",
                self.config.max_seed_batch
            )));
        }

        let documents = self
            .generator
            .generate_many(num as usize)
            .into_iter()
            .map(|mut board| {
                let id = board.id.take().unwrap_or_else(|| Uuid::new_v4().to_string());
                Ok((id, board.source()?))
            })
            .collect::<Result<Vec<_>>>()?;

        let indexed = self.engine.bulk_index(&documents).await?;
        tracing::info!(requested = num, indexed, "Random boards generated");
        Ok(true)
    }

    /// Listing filtered by exact facet values, with the facet summary
    pub async fn list(&self, params: &HashMap<String, String>) -> Result<BoardPage> {
        self.validator.validate(params)?;
        let page = PageParameters::from_params(params)?;
        let selection = FilterSelection::from_params(&self.config, params);

        let request = self.translator.filter_request(&page, &selection);
        tracing::debug!(
            page = page.page,
            page_size = page.page_size,
            sort_by = %page.sort_by,
            selected = selection.len(),
            "Listing boards"
        );

        let result = self.engine.search(&request).await?;
        assembler::assemble_filtered_page(result, &page, &selection)
    }

    /// Fuzzy free-text search over the searchable fields
    pub async fn search(&self, params: &HashMap<String, String>) -> Result<BoardPage> {
        self.validator.validate(params)?;
        let page = PageParameters::from_params(params)?;

        let text = match params.get(FREE_TEXT_KEY).map(|q| q.trim()) {
            Some("") => return Err(AppError::malformed(FREE_TEXT_KEY, "must not be empty")),
            Some(text) => text,
            None => return Err(AppError::malformed(FREE_TEXT_KEY, "is required")),
        };

        let request = self.translator.search_request(&page, text);
        tracing::debug!(query = %text, page = page.page, page_size = page.page_size, "Searching boards");

        let result = self.engine.search(&request).await?;
        assembler::assemble_page(result, &page)
    }

    /// Every facet with its values over the whole catalog
    pub async fn filters(&self) -> Result<Vec<BoardFilter>> {
        let request = self.translator.filters_request();
        let result = self.engine.search(&request).await?;

        tracing::debug!(facets = result.aggregations.len(), "Listing filters");
        Ok(assembler::assemble_filters(result.aggregations, &FilterSelection::empty()))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FixtureConfig;
    use crate::search::InMemoryEngine;
    use serde_json::json;

    fn service() -> CatalogService {
        let generator = BoardGenerator::new(&FixtureConfig::default()).unwrap();
        CatalogService::new(
            Arc::new(InMemoryEngine::new()),
            CatalogConfig::default(),
            generator,
        )
    }

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_create_keeps_given_id() {
        let service = service();
        let board = Board {
            id: Some("fixed".to_string()),
            name: "Orca".to_string(),
            ..Default::default()
        };
        assert_eq!(service.create(board).await.unwrap(), "fixed");
        assert!(service.get("fixed").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_create_generates_id_when_blank() {
        let service = service();
        let board = Board {
            id: Some("  ".to_string()),
            ..Default::default()
        };
        let id = service.create(board).await.unwrap();
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[tokio::test]
    async fn test_update_rejects_non_object() {
        let err = service().update("x", json!([1, 2])).await.unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_update_with_wrong_types_leaves_board_untouched() {
        let service = service();
        let board = Board {
            id: Some("b1".to_string()),
            year: 2018,
            name: "Orca".to_string(),
            ..Default::default()
        };
        service.create(board).await.unwrap();

        for partial in [
            json!({"year": "abc"}),
            json!({"spec": {"flex": "stiff"}}),
            json!({"features": [3]}),
            json!({"name": null}),
        ] {
            let err = service.update("b1", partial).await.unwrap_err();
            assert_eq!(err.error_code(), "VALIDATION_ERROR");
        }

        let stored = service.get("b1").await.unwrap().unwrap();
        assert_eq!(stored.year, 2018);
        assert_eq!(stored.name, "Orca");
        assert_eq!(service.list(&HashMap::new()).await.unwrap().total, 1);
    }

    #[tokio::test]
    async fn test_update_missing_board_is_not_found() {
        let err = service().update("missing", json!({"year": 2021})).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_seed_bounds() {
        let service = service();
        assert!(service.seed(0).await.is_err());
        assert!(service.seed(10_001).await.is_err());
        assert!(service.seed(3).await.unwrap());

        let page = service.list(&HashMap::new()).await.unwrap();
        assert_eq!(page.total, 3);
    }

    #[tokio::test]
    async fn test_search_requires_query_text() {
        let service = service();
        let err = service.search(&params(&[("page", "0")])).await.unwrap_err();
        assert_eq!(err.error_code(), "MALFORMED_PARAMETER");

        let err = service.search(&params(&[("q", " ")])).await.unwrap_err();
        assert_eq!(err.error_code(), "MALFORMED_PARAMETER");
    }

    #[tokio::test]
    async fn test_list_rejects_unknown_parameter() {
        let err = service().list(&params(&[("bogus", "1")])).await.unwrap_err();
        assert_eq!(err.to_string(), "Bad request parameter: bogus");
    }
}
