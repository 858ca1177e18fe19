//! Configuration types and loading
//!
//! Typed application configuration, loaded from the environment with the
//! `CAP__` prefix (e.g. `CAP__SERVER__PORT=8080`).

use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub matching: MatchingConfig,

    #[serde(default)]
    pub duplicates: DuplicateConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

/// Defaults for team-match queries when the caller omits them
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MatchingConfig {
    #[serde(default = "default_suggestion_limit")]
    pub suggestion_limit: usize,
    #[serde(default)]
    pub min_score: u8,
}

/// Duplicate-abstract detection settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DuplicateConfig {
    /// Similarity percentage at or above which an abstract is flagged
    #[serde(default = "default_duplicate_threshold")]
    pub threshold: f64,
    /// Abstracts shorter than this are rejected before checking
    #[serde(default = "default_min_abstract_length")]
    pub min_abstract_length: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_database_url() -> String {
    "postgres://localhost/capstone".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_suggestion_limit() -> usize {
    20
}

fn default_duplicate_threshold() -> f64 {
    30.0
}

fn default_min_abstract_length() -> usize {
    50
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            suggestion_limit: default_suggestion_limit(),
            min_score: 0,
        }
    }
}

impl Default for DuplicateConfig {
    fn default() -> Self {
        Self {
            threshold: default_duplicate_threshold(),
            min_abstract_length: default_min_abstract_length(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("CAP").separator("__"))
            .build()?
            .try_deserialize()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
