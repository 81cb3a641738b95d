//! Runtime configuration, read from the environment once at startup.
//!
//! | Variable | Default |
//! |---|---|
//! | `PORT` | `3000` |
//! | `HOST` | `0.0.0.0` |
//! | `PRENDAS_STORE` | `mongodb` (or `memory`) |
//! | `MONGODB_URI` | `mongodb://localhost:27017` |
//! | `MONGODB_DATABASE` | `prendas` |
//! | `MONGODB_COLLECTION` | `prendas` |
//! | `MONGODB_TIMEOUT_MS` | `5000` |

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use thiserror::Error;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("PORT must be a port number, got `{0}`")]
    InvalidPort(String),

    #[error("HOST must be an IP address, got `{0}`")]
    InvalidHost(String),

    #[error("PRENDAS_STORE must be `mongodb` or `memory`, got `{0}`")]
    UnknownBackend(String),

    #[error("MONGODB_TIMEOUT_MS must be a number of milliseconds, got `{0}`")]
    InvalidTimeout(String),
}

/// Which store backs the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Mongo,
    Memory,
}

/// MongoDB connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
    pub collection: String,
    /// How long the driver waits for a reachable server before failing.
    pub server_selection_timeout: Duration,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017".to_string(),
            database: "prendas".to_string(),
            collection: "prendas".to_string(),
            server_selection_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub backend: Backend,
    pub mongo: MongoConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            backend: Backend::Mongo,
            mongo: MongoConfig::default(),
        }
    }
}

impl Config {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable source (for testing).
    ///
    /// Unset or empty variables take their defaults; set but invalid ones
    /// are errors.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(port) = var("PORT") {
            config.port = port.trim().parse().map_err(|_| ConfigError::InvalidPort(port))?;
        }
        if let Some(host) = var("HOST") {
            config.host = host.trim().parse().map_err(|_| ConfigError::InvalidHost(host))?;
        }
        if let Some(backend) = var("PRENDAS_STORE") {
            config.backend = match backend.trim().to_ascii_lowercase().as_str() {
                "mongodb" | "mongo" => Backend::Mongo,
                "memory" => Backend::Memory,
                _ => return Err(ConfigError::UnknownBackend(backend)),
            };
        }
        if let Some(uri) = var("MONGODB_URI") {
            config.mongo.uri = uri;
        }
        if let Some(database) = var("MONGODB_DATABASE") {
            config.mongo.database = database;
        }
        if let Some(collection) = var("MONGODB_COLLECTION") {
            config.mongo.collection = collection;
        }
        if let Some(timeout) = var("MONGODB_TIMEOUT_MS") {
            let ms: u64 = timeout
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidTimeout(timeout))?;
            config.mongo.server_selection_timeout = Duration::from_millis(ms);
        }

        Ok(config)
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
