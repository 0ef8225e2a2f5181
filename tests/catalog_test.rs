//! Catalog service tests against the in-memory engine

use board_catalog::catalog::CatalogService;
use board_catalog::config::{CatalogConfig, Config, EngineBackend, FixtureConfig};
use board_catalog::fixtures::BoardGenerator;
use board_catalog::models::Board;
use board_catalog::search::{create_engine, InMemoryEngine};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

fn create_test_service() -> CatalogService {
    CatalogService::new(
        Arc::new(InMemoryEngine::new()),
        CatalogConfig::default(),
        BoardGenerator::new(&FixtureConfig::default()).unwrap(),
    )
}

fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[tokio::test]
async fn test_create_without_id_then_get_is_equal() {
    let service = create_test_service();
    let board = BoardGenerator::new(&FixtureConfig::default())
        .unwrap()
        .generate();
    let original = Board { id: None, ..board };

    let id = service.create(original.clone()).await.unwrap();
    let stored = service.get(&id).await.unwrap().unwrap();

    assert_eq!(stored.id.as_deref(), Some(id.as_str()));
    assert_eq!(Board { id: None, ..stored }, original);
}

#[tokio::test]
async fn test_get_missing_is_none() {
    let service = create_test_service();
    assert!(service.get("does-not-exist").await.unwrap().is_none());
}

#[tokio::test]
async fn test_partial_update_keeps_other_fields() {
    let service = create_test_service();
    let board = BoardGenerator::new(&FixtureConfig::default())
        .unwrap()
        .generate();
    let id = service.create(board.clone()).await.unwrap();

    let updated = service.update(&id, json!({"year": 2021})).await.unwrap();

    assert_eq!(updated.year, 2021);
    assert_eq!(updated.name, board.name);
    assert_eq!(updated.spec, board.spec);
    assert_eq!(updated.features, board.features);
}

#[tokio::test]
async fn test_filtered_listing_matches_all_selected_values() {
    let service = create_test_service();
    service.seed(300).await.unwrap();

    let page = service
        .list(&params(&[("size", "158W"), ("terrain", "Powder"), ("pageSize", "500")]))
        .await
        .unwrap();

    assert_eq!(page.values.len() as u64, page.total);
    assert!(page
        .values
        .iter()
        .all(|b| b.size == "158W" && b.terrain == "Powder"));

    let filters = page.filters.unwrap();
    assert_eq!(filters.len(), 6);
    for filter in &filters {
        let expected = match filter.name.as_str() {
            "size" => "158W",
            "terrain" => "Powder",
            _ => "",
        };
        assert_eq!(filter.selected_value, expected);
    }

    // facets count the whole match set, not just the page
    let size = filters.iter().find(|f| f.name == "size").unwrap();
    if page.total > 0 {
        assert_eq!(size.values.get("158W"), Some(page.total));
    }
}

#[tokio::test]
async fn test_total_pages_over_seeded_catalog() {
    let service = create_test_service();
    service.seed(47).await.unwrap();

    for page_size in [1u32, 5, 10, 46, 47, 48, 100] {
        let page_size_text = page_size.to_string();
        let page = service
            .list(&params(&[("pageSize", page_size_text.as_str())]))
            .await
            .unwrap();
        assert_eq!(page.total, 47);
        assert_eq!(page.total_pages, 47u64.div_ceil(u64::from(page_size)));
        assert_eq!(page.values.len() as u32, page_size.min(47));
    }
}

#[tokio::test]
async fn test_pages_do_not_overlap() {
    let service = create_test_service();
    service.seed(30).await.unwrap();

    let mut seen = Vec::new();
    for page in 0..3 {
        let page_text = page.to_string();
        let result = service
            .list(&params(&[("page", page_text.as_str()), ("sortBy", "year"), ("sortOrder", "asc")]))
            .await
            .unwrap();
        seen.extend(result.values.into_iter().filter_map(|b| b.id));
    }

    let total = seen.len();
    seen.sort();
    seen.dedup();
    assert_eq!(total, 30);
    assert_eq!(seen.len(), 30);
}

#[tokio::test]
async fn test_search_ignores_filter_parameters_but_validates_names() {
    let service = create_test_service();
    service
        .create(Board {
            name: "Wolverine".to_string(),
            size: "154".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    let page = service
        .search(&params(&[("q", "wolverin"), ("size", "158W")]))
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert!(page.filters.is_none());

    let err = service
        .search(&params(&[("q", "wolverine"), ("colour", "red")]))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_PARAMETER");
}

#[tokio::test]
async fn test_filters_enumerate_every_facet() {
    let service = create_test_service();
    service.seed(100).await.unwrap();

    let filters = service.filters().await.unwrap();
    let names: Vec<&str> = filters.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["year", "size", "terrain", "ridingLevel", "bend", "shape"]);

    let year_total: u64 = filters[0].values.0.iter().map(|(_, count)| count).sum();
    assert_eq!(year_total, 100);
    assert!(filters.iter().all(|f| f.selected_value.is_empty()));
}

#[tokio::test]
async fn test_delete_all_then_list_is_empty() {
    let service = create_test_service();
    service.seed(12).await.unwrap();

    assert!(service.delete_all().await.unwrap());
    let page = service
        .list(&params(&[("page", "0"), ("pageSize", "10")]))
        .await
        .unwrap();
    assert_eq!(page.total, 0);
    assert_eq!(page.total_pages, 0);

    // nothing left is still success
    assert!(service.delete_all().await.unwrap());
}

#[tokio::test]
async fn test_service_from_configured_in_memory_backend() {
    let mut config = Config::default();
    config.engine.backend = EngineBackend::InMemory;

    let engine = create_engine(&config.engine).await.unwrap();
    assert_eq!(engine.name(), "in_memory");

    let service = CatalogService::new(
        engine,
        config.catalog.clone(),
        BoardGenerator::new(&config.fixtures).unwrap(),
    );
    assert!(service.seed(5).await.unwrap());
    assert_eq!(service.list(&HashMap::new()).await.unwrap().total, 5);
}
