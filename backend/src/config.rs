//! Configuration management for the Crop Advisory Platform
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with ADVISORY__ prefix (e.g. ADVISORY__SERVER__PORT)

use config::{
    builder::{ConfigBuilder, DefaultState},
    ConfigError, Environment, File,
};
use serde::Deserialize;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT authentication configuration
    pub jwt: JwtConfig,

    /// Password hashing configuration
    pub auth: AuthConfig,

    /// Upstream advisory services
    pub services: ServicesConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL. Reports and users are kept in memory when unset.
    pub url: Option<String>,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Secret key for signing JWT tokens
    pub secret: String,

    /// Access token expiration in seconds
    pub access_token_expiry: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// bcrypt work factor
    pub bcrypt_cost: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServicesConfig {
    /// Stage plan prediction endpoint
    pub predict_url: String,

    /// Forecast fill endpoint
    pub forecast_url: String,

    /// Risk calculation endpoint
    pub risk_url: String,

    /// Expert chat base URL (`/get` is appended)
    pub expert_chat_url: String,

    /// Reverse geocoding base URL
    pub geocoding_url: String,

    /// Per-call timeout for the onboarding services, in milliseconds
    pub timeout_ms: u64,

    /// Timeout for the reverse geocoding lookup, in milliseconds
    pub geocoding_timeout_ms: u64,
}

impl ServicesConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn geocoding_timeout(&self) -> Duration {
        Duration::from_millis(self.geocoding_timeout_ms)
    }
}

/// Default per-call timeout for the onboarding services
pub const DEFAULT_SERVICE_TIMEOUT_MS: u64 = 120_000;

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("ADVISORY_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = Self::default_builder(&environment)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (ADVISORY__ prefix)
            .add_source(
                Environment::with_prefix("ADVISORY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Built-in defaults only, ignoring files and environment
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::default_builder("development")?
            .build()?
            .try_deserialize()
    }

    fn default_builder(environment: &str) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        config::Config::builder()
            .set_default("environment", environment)?
            .set_default("server.port", 5000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("jwt.secret", "development-secret-key")?
            .set_default("jwt.access_token_expiry", 3600)?
            .set_default("auth.bcrypt_cost", i64::from(bcrypt::DEFAULT_COST))?
            .set_default("services.predict_url", "http://localhost:5100/predict")?
            .set_default("services.forecast_url", "http://localhost:5101/fill-forecast")?
            .set_default("services.risk_url", "http://localhost:5102/calculate-risk")?
            .set_default("services.expert_chat_url", "http://localhost:8080")?
            .set_default(
                "services.geocoding_url",
                "https://nominatim.openstreetmap.org",
            )?
            .set_default("services.timeout_ms", DEFAULT_SERVICE_TIMEOUT_MS as i64)?
            .set_default("services.geocoding_timeout_ms", 10_000)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            host: "0.0.0.0".to_string(),
        }
    }
}
