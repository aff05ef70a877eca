use std::env;

/// Read an environment variable, falling back to a default when unset.
pub fn env_or(key: &str, fallback: &str) -> String {
    env::var(key).unwrap_or_else(|_| fallback.to_string())
}

/// Configuration for the batch utilities, loaded from environment
/// variables. Every knob has a fallback so the tools run against a local
/// stack with no environment at all.
#[derive(Debug, Clone)]
pub struct Config {
    // Search store
    pub es_host: String,
    pub es_port: String,
    pub es_user: String,
    pub es_pass: String,

    // Graph store
    pub neo_uri: String,
    pub neo_user: String,
    pub neo_pass: String,

    // Collaborating services
    pub feeds_api: String,
    pub scrape_api: String,

    // Twitter
    pub twitter_bearer_token: String,

    // Pipeline
    pub page_size: usize,
    pub workers: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            es_host: env_or("ES_HOST", "127.0.0.1"),
            es_port: env_or("ES_PORT", "9200"),
            es_user: env_or("ES_USER", ""),
            es_pass: env_or("ES_PASS", ""),
            neo_uri: env_or("NEO_URI", "bolt://localhost:7687"),
            neo_user: env_or("NEO_USER", "neo4j"),
            neo_pass: env_or("NEO_PASS", "123"),
            feeds_api: env_or("API_FEEDS", "http://localhost:8000"),
            scrape_api: env_or("SVC_SCRAPE", "http://localhost:50050"),
            twitter_bearer_token: env_or("TWITTER_BEARER_TOKEN", ""),
            page_size: env_or("PAGE_SIZE", "100")
                .parse()
                .expect("PAGE_SIZE must be a number"),
            workers: env_or("WORKERS", "10")
                .parse()
                .expect("WORKERS must be a number"),
        }
    }

    /// Base URL of the search store, e.g. `http://127.0.0.1:9200`.
    pub fn es_url(&self) -> String {
        format!("http://{}:{}", self.es_host, self.es_port)
    }
}
