use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Catalog (TMDB) API key
    #[serde(default)]
    pub catalog_api_key: String,

    /// Catalog API base URL
    #[serde(default = "default_catalog_api_url")]
    pub catalog_api_url: String,

    /// Embedding (Cohere) API key
    #[serde(default)]
    pub embedding_api_key: String,

    /// Embedding API base URL
    #[serde(default = "default_embedding_api_url")]
    pub embedding_api_url: String,

    /// Embedding model name
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Per-request timeout applied to every provider call, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Popular-listing pages fetched per media kind at startup
    #[serde(default = "default_warmup_pages")]
    pub warmup_pages: u32,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_catalog_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_embedding_api_url() -> String {
    "https://api.cohere.ai/v1".to_string()
}

fn default_embedding_model() -> String {
    "embed-english-v3.0".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_warmup_pages() -> u32 {
    3
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// API keys default to empty here; the provider constructors reject blank
    /// keys so a missing key still fails startup.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
