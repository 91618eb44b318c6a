//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Authentication / OTP configuration.
    #[serde(default)]
    pub auth: AuthConfig,
    /// SMS gateway configuration.
    #[serde(default)]
    pub sms: Option<SmsConfig>,
    /// Payment gateway configuration.
    #[serde(default)]
    pub payment: Option<PaymentConfig>,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this instance.
    pub url: String,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Authentication / OTP configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// OTP validity window in seconds.
    #[serde(default = "default_otp_ttl")]
    pub otp_ttl_secs: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            otp_ttl_secs: default_otp_ttl(),
        }
    }
}

/// SMS gateway configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SmsConfig {
    /// Base URL of the SMS gateway.
    pub gateway_url: String,
    /// API key for the gateway.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Default country prefix applied to bare national numbers.
    #[serde(default = "default_country_prefix")]
    pub country_prefix: String,
}

/// Payment gateway configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Gateway key id.
    pub key_id: String,
    /// Gateway key secret (used for signature verification).
    pub key_secret: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

const fn default_otp_ttl() -> i64 {
    300
}

fn default_country_prefix() -> String {
    "91".to_string()
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `MAKAAN_ENV`)
    /// 3. Environment variables with `MAKAAN_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("MAKAAN_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("MAKAAN")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("MAKAAN")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
