use crate::api::{handlers, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

/// Build the main API router
pub fn build_router(state: AppState) -> Router {
    let request_timeout = state.request_timeout;

    Router::new()
        // Health endpoints
        .route("/health", get(handlers::health_check))
        .route("/health/live", get(handlers::health_check))
        // Listing and search
        .route(
            "/boards",
            get(handlers::list_boards)
                .post(handlers::create_board)
                .delete(handlers::delete_all_boards),
        )
        .route("/boards/search", get(handlers::search_boards))
        .route("/boards/filters", get(handlers::list_filters))
        .route("/boards/addRandom/:num", post(handlers::add_random_boards))
        // Single board
        .route(
            "/boards/:id",
            get(handlers::get_board)
                .put(handlers::update_board)
                .delete(handlers::delete_board),
        )
        // Add state
        .with_state(state)
        // Add middleware
        .layer(TimeoutLayer::new(request_timeout))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
}
