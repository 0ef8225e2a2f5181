use board_catalog::{
    api::{build_router, AppState},
    catalog::CatalogService,
    config::Config,
    fixtures::BoardGenerator,
    search::create_engine,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        eprintln!("Using default configuration");
        Config::default()
    });

    init_tracing(&config);

    tracing::info!(
        service = %config.observability.service_name,
        "Starting board catalog v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Initialize search engine
    tracing::info!("Search backend: {:?}", config.engine.backend);
    let engine = create_engine(&config.engine).await?;
    tracing::info!(engine = engine.name(), "Search engine initialized");

    let generator = BoardGenerator::new(&config.fixtures)?;
    let catalog = Arc::new(CatalogService::new(engine, config.catalog.clone(), generator));

    let state = AppState::new(catalog)
        .with_request_timeout(Duration::from_secs(config.server.request_timeout_secs));
    let app = build_router(state);

    // Start HTTP server
    let http_addr = format!("{}:{}", config.server.host, config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_addr).await?;

    tracing::info!("HTTP API server listening on http://{}", http_addr);
    tracing::info!("   Health check: http://{}/health", http_addr);
    tracing::info!("   Boards: http://{}/boards", http_addr);

    let http_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(http_listener, app).await {
            tracing::error!("HTTP server error: {}", e);
        }
    });

    tokio::select! {
        _ = http_handle => {
            tracing::warn!("HTTP server stopped");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    tracing::info!("Shutting down gracefully...");
    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "board_catalog={level},tower_http={level}",
            level = config.observability.log_level
        )
        .into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.observability.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
