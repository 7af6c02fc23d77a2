#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub search_base_url: String,
    pub search_api_key: Option<String>,
    /// Imagery provider; enrichment is disabled when unset.
    pub enrichment_base_url: Option<String>,
    pub search_radius_meters: f64,
    pub fallback_query: String,
    pub max_items: usize,
    pub stale_after_secs: u64,
    pub stale_distance_meters: f64,
    pub http_timeout_secs: u64,
    pub user_agent: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("search_base_url", &self.search_base_url)
            .field(
                "search_api_key",
                &self.search_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("enrichment_base_url", &self.enrichment_base_url)
            .field("search_radius_meters", &self.search_radius_meters)
            .field("fallback_query", &self.fallback_query)
            .field("max_items", &self.max_items)
            .field("stale_after_secs", &self.stale_after_secs)
            .field("stale_distance_meters", &self.stale_distance_meters)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
