use crate::api::AppState;
use crate::catalog::{BoardFilter, BoardPage};
use crate::error::{AppError, Result};
use crate::models::Board;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        engine: state.catalog.engine_name().to_string(),
    }))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub engine: String,
}

/// `{"result": ...}` envelope
#[derive(Debug, Serialize)]
pub struct ResultResponse<T> {
    pub result: T,
}

#[derive(Debug, Serialize)]
pub struct ValueResponse {
    pub value: Board,
}

#[derive(Debug, Serialize)]
pub struct IdResponse {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct FiltersResponse {
    pub filters: Vec<BoardFilter>,
}

/// Seed the catalog with random boards
pub async fn add_random_boards(
    State(state): State<AppState>,
    Path(num): Path<String>,
) -> Result<Json<ResultResponse<bool>>> {
    let num: u32 = num
        .trim()
        .parse()
        .map_err(|e| AppError::malformed("num", format!("'{}' is not a valid number: {}", num, e)))?;

    let result = state.catalog.seed(num).await?;
    Ok(Json(ResultResponse { result }))
}

/// Get a board by ID
pub async fn get_board(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ValueResponse>> {
    let board = state
        .catalog
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Board {}", id)))?;
    Ok(Json(ValueResponse { value: board }))
}

pub async fn delete_board(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ResultResponse<bool>>> {
    let result = state.catalog.delete(&id).await?;
    Ok(Json(ResultResponse { result }))
}

/// Create a board; an id is generated when the body has none
pub async fn create_board(
    State(state): State<AppState>,
    Json(board): Json<Board>,
) -> Result<Json<IdResponse>> {
    let id = state.catalog.create(board).await?;
    Ok(Json(IdResponse { id }))
}

/// Partially update a board
pub async fn update_board(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(partial): Json<Value>,
) -> Result<Json<ResultResponse<Board>>> {
    let result = state.catalog.update(&id, partial).await?;
    Ok(Json(ResultResponse { result }))
}

/// List boards, filtered by facet values
pub async fn list_boards(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ResultResponse<BoardPage>>> {
    let result = state.catalog.list(&params).await?;
    Ok(Json(ResultResponse { result }))
}

/// Fuzzy free-text search
pub async fn search_boards(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ResultResponse<BoardPage>>> {
    let result = state.catalog.search(&params).await?;
    Ok(Json(ResultResponse { result }))
}

pub async fn list_filters(State(state): State<AppState>) -> Result<Json<FiltersResponse>> {
    let filters = state.catalog.filters().await?;
    Ok(Json(FiltersResponse { filters }))
}

pub async fn delete_all_boards(State(state): State<AppState>) -> Result<Json<ResultResponse<bool>>> {
    let result = state.catalog.delete_all().await?;
    Ok(Json(ResultResponse { result }))
}
