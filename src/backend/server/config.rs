/**
 * Server Configuration
 *
 * Configuration is resolved in three layers, later ones winning:
 *
 * 1. Built-in defaults (`ServerConfig::default`)
 * 2. An optional TOML file named by `FORMHUB_CONFIG`
 * 3. Environment variables: `SERVER_PORT`, `DATABASE_URL`, `JWT_SECRET`
 *
 * # Example file
 *
 * ```toml
 * port = 8080
 * database_url = "postgres://localhost/formhub"
 * jwt_secret = "change-me"
 * log_filter = "formhub=debug,tower_http=info"
 * ```
 *
 * # Datastore selection
 *
 * `load_store` connects to PostgreSQL when a database URL is configured.
 * Without one, or when the connection fails, the server logs a warning and
 * runs on the in-memory store.
 */

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;

use crate::backend::store::{Datastore, MemoryStore, PgStore};

/// Environment variable naming the TOML configuration file
pub const CONFIG_PATH_ENV: &str = "FORMHUB_CONFIG";

const DEV_JWT_SECRET: &str = "formhub-dev-secret-change-me";

/// Configuration loading failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Resolved server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// TCP port to listen on
    pub port: u16,
    /// PostgreSQL URL; `None` selects the in-memory store
    pub database_url: Option<String>,
    /// HS256 signing secret for session tokens
    pub jwt_secret: String,
    /// Default `tracing` filter when `RUST_LOG` is unset
    pub log_filter: String,
    /// bcrypt work factor for new password hashes
    pub bcrypt_cost: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            database_url: None,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            log_filter: "info".to_string(),
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Overlay values found through `lookup` (normally `std::env::var`)
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("SERVER_PORT") {
            self.port = port.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "SERVER_PORT",
                value: port.clone(),
            })?;
        }
        if let Some(url) = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()) {
            self.database_url = Some(url);
        }
        if let Some(secret) = lookup("JWT_SECRET").filter(|secret| !secret.is_empty()) {
            self.jwt_secret = secret;
        }
        Ok(())
    }

    /// Defaults, then the `FORMHUB_CONFIG` file if set, then the environment
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Whether tokens would be signed with the built-in development secret
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    /// Settings for tests: in-memory store and cheap password hashing
    pub fn for_tests() -> Self {
        Self {
            jwt_secret: "formhub-test-secret".to_string(),
            bcrypt_cost: 4,
            ..Self::default()
        }
    }
}

/// Select and initialize the datastore
///
/// This function:
/// 1. Uses the configured database URL, if any
/// 2. Creates a PostgreSQL connection pool
/// 3. Runs database migrations
///
/// Any failure along the way falls back to the in-memory store.
pub async fn load_store(config: &ServerConfig) -> Arc<dyn Datastore> {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set. Using the in-memory store; data will not persist.");
        return Arc::new(MemoryStore::new());
    };

    tracing::info!("Connecting to database...");

    let pool = match PgPool::connect(database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {:?}", e);
            tracing::warn!("Falling back to the in-memory store.");
            return Arc::new(MemoryStore::new());
        }
    };

    tracing::info!("Running database migrations...");
    match sqlx::migrate!().run(&pool).await {
        Ok(_) => tracing::info!("Database migrations completed successfully"),
        Err(e) => {
            tracing::error!("Failed to run database migrations: {}", e);
            tracing::warn!("Continuing without migrations - database might not be up to date");
        }
    }

    Arc::new(PgStore::new(pool))
}
