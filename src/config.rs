use serde::Deserialize;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Piped API base URL used for search, suggestions and stream resolution
    #[serde(default = "default_piped_api_url")]
    pub piped_api_url: String,

    /// Timeout applied to every extraction request, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Upper bound on concurrently open search sessions
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    /// Seconds a search session may sit unused before it is evicted
    #[serde(default = "default_session_idle_ttl_secs")]
    pub session_idle_ttl_secs: u64,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_piped_api_url() -> String {
    "https://pipedapi.kavin.rocks".to_string()
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_max_sessions() -> usize {
    1000
}

fn default_session_idle_ttl_secs() -> u64 {
    900
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn session_idle_ttl(&self) -> Duration {
        Duration::from_secs(self.session_idle_ttl_secs)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
