use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Search engine configuration
    pub engine: EngineConfig,

    /// Request allow-lists and query tuning
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Value pools for the random board generator
    #[serde(default)]
    pub fixtures: FixtureConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/default.toml".to_string());

        config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(&config_path).required(false))
            // Override with environment variables (prefix: BOARD_CATALOG_)
            .add_source(
                config::Environment::with_prefix("BOARD_CATALOG")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("catalog.filter_names")
                    .with_list_parse_key("catalog.page_parameter_names")
                    .with_list_parse_key("catalog.search_fields")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Engine backend type
    #[serde(default)]
    pub backend: EngineBackend,

    /// Base URL of the Elasticsearch cluster
    #[serde(default = "default_engine_url")]
    pub url: String,

    /// Index holding the boards
    #[serde(default = "default_index")]
    pub index: String,

    /// Engine request timeout (seconds)
    #[serde(default = "default_engine_timeout")]
    pub timeout_secs: u64,

    /// Wait for an index refresh after every write so reads see it
    #[serde(default = "default_true")]
    pub refresh: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            backend: EngineBackend::default(),
            url: default_engine_url(),
            index: default_index(),
            timeout_secs: default_engine_timeout(),
            refresh: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum EngineBackend {
    #[default]
    Elasticsearch,
    InMemory,
}

/// Allow-lists that drive request validation and query translation.
///
/// Built once at startup and shared read-only by every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Facet fields: accepted as request filters and aggregated on every listing
    #[serde(default = "default_filter_names")]
    pub filter_names: Vec<String>,

    /// Accepted paging parameter names
    #[serde(default = "default_page_parameter_names")]
    pub page_parameter_names: Vec<String>,

    /// Fields matched by free-text search
    #[serde(default = "default_search_fields")]
    pub search_fields: Vec<String>,

    /// Bucket cap for every facet aggregation
    #[serde(default = "default_facet_size")]
    pub facet_size: usize,

    /// Upper bound for a single random seeding request
    #[serde(default = "default_max_seed_batch")]
    pub max_seed_batch: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            filter_names: default_filter_names(),
            page_parameter_names: default_page_parameter_names(),
            search_fields: default_search_fields(),
            facet_size: default_facet_size(),
            max_seed_batch: default_max_seed_batch(),
        }
    }
}

impl CatalogConfig {
    pub fn is_filter(&self, name: &str) -> bool {
        self.filter_names.iter().any(|f| f == name)
    }

    pub fn is_page_parameter(&self, name: &str) -> bool {
        self.page_parameter_names.iter().any(|p| p == name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureConfig {
    #[serde(default = "default_sizes")]
    pub sizes: Vec<String>,

    #[serde(default = "default_riding_levels")]
    pub riding_levels: Vec<String>,

    #[serde(default = "default_bends")]
    pub bends: Vec<String>,

    #[serde(default = "default_shapes")]
    pub shapes: Vec<String>,

    #[serde(default = "default_terrains")]
    pub terrains: Vec<String>,

    #[serde(default = "default_stance_min")]
    pub stance_min: Vec<String>,

    #[serde(default = "default_stance_max")]
    pub stance_max: Vec<String>,

    #[serde(default = "default_stance_set_back")]
    pub stance_set_back: Vec<String>,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            sizes: default_sizes(),
            riding_levels: default_riding_levels(),
            bends: default_bends(),
            shapes: default_shapes(),
            terrains: default_terrains(),
            stance_min: default_stance_min(),
            stance_max: default_stance_max(),
            stance_set_back: default_stance_set_back(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,

    /// Service name
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
            service_name: default_service_name(),
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_engine_url() -> String {
    "http://localhost:9200".to_string()
}

fn default_index() -> String {
    "snowboard".to_string()
}

fn default_engine_timeout() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn default_filter_names() -> Vec<String> {
    strings(&["year", "size", "terrain", "ridingLevel", "bend", "shape"])
}

fn default_page_parameter_names() -> Vec<String> {
    strings(&["page", "pageSize", "sortBy", "sortOrder"])
}

fn default_search_fields() -> Vec<String> {
    strings(&["name", "details", "terrain", "ridingLevel", "bend", "shape"])
}

fn default_facet_size() -> usize {
    100
}

fn default_max_seed_batch() -> u32 {
    10_000
}

fn default_sizes() -> Vec<String> {
    strings(&[
        "146", "150", "152W", "154", "155W", "156", "158W", "159", "161W", "163W",
    ])
}

fn default_riding_levels() -> Vec<String> {
    strings(&["Beginner", "Intermediate", "Advanced", "Expert"])
}

fn default_bends() -> Vec<String> {
    strings(&["Camber", "Rocker", "Flat", "Hybrid Camber", "Hybrid Rocker"])
}

fn default_shapes() -> Vec<String> {
    strings(&["Twin", "Directional", "Directional Twin", "Tapered"])
}

fn default_terrains() -> Vec<String> {
    strings(&["All Mountain", "Freestyle", "Freeride", "Powder", "Park"])
}

fn default_stance_min() -> Vec<String> {
    strings(&["19.0", "19.5", "20.0"])
}

fn default_stance_max() -> Vec<String> {
    strings(&["23.0", "23.5", "24.0", "24.5"])
}

fn default_stance_set_back() -> Vec<String> {
    strings(&["0.0", "0.5", "1.0"])
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "board-catalog".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        assert_eq!(default_http_port(), 8080);
        assert_eq!(default_engine_url(), "http://localhost:9200");
        assert_eq!(default_index(), "snowboard");
        assert_eq!(default_facet_size(), 100);
        assert_eq!(default_log_level(), "info");
    }

    #[test]
    fn test_engine_backend() {
        assert_eq!(EngineBackend::default(), EngineBackend::Elasticsearch);
    }

    #[test]
    fn test_catalog_allow_lists() {
        let catalog = CatalogConfig::default();
        assert!(catalog.is_filter("size"));
        assert!(catalog.is_filter("ridingLevel"));
        assert!(!catalog.is_filter("sortBy"));
        assert!(catalog.is_page_parameter("pageSize"));
        assert!(!catalog.is_page_parameter("q"));
    }

    #[test]
    fn test_embedded_defaults_parse() {
        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.engine.backend, EngineBackend::Elasticsearch);
        assert_eq!(config.catalog.page_parameter_names.len(), 4);
        assert_eq!(config.fixtures.sizes.len(), 10);
    }
}
