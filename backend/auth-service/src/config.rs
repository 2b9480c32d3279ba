/// Configuration management
///
/// Loaded once at startup from the environment (and an optional `.env`
/// file). Every field maps to an upper-cased env var of the same name.
use chrono::Duration;
use crypto_core::jwt::{
    TokenConfig, DEFAULT_ACCESS_TOKEN_EXPIRY_SECS, DEFAULT_REFRESH_TOKEN_EXPIRY_SECS,
};
use serde::Deserialize;
use std::fmt;

#[derive(Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub server_host: String,
    #[serde(default = "default_port")]
    pub server_port: u16,
    /// Unset selects the in-memory store
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,
    pub access_token_secret: String,
    #[serde(default = "default_access_expiry")]
    pub access_token_expiry_secs: i64,
    pub refresh_token_secret: String,
    #[serde(default = "default_refresh_expiry")]
    pub refresh_token_expiry_secs: i64,
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_max_connections() -> u32 {
    10
}

fn default_access_expiry() -> i64 {
    DEFAULT_ACCESS_TOKEN_EXPIRY_SECS
}

fn default_refresh_expiry() -> i64 {
    DEFAULT_REFRESH_TOKEN_EXPIRY_SECS
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Config {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenv::dotenv().ok();
        envy::from_env()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn token_config(&self) -> TokenConfig {
        TokenConfig {
            access_secret: self.access_token_secret.clone(),
            access_ttl: Duration::seconds(self.access_token_expiry_secs),
            refresh_secret: self.refresh_token_secret.clone(),
            refresh_ttl: Duration::seconds(self.refresh_token_expiry_secs),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("database", &self.database_url.as_ref().map(|_| "<set>"))
            .field("database_max_connections", &self.database_max_connections)
            .field("access_token_expiry_secs", &self.access_token_expiry_secs)
            .field("refresh_token_expiry_secs", &self.refresh_token_expiry_secs)
            .field("cors_origin", &self.cors_origin)
            .finish_non_exhaustive()
    }
}
