//! Configuration loading for drugscope.
//! Reads drugscope.toml from the current directory or the path in DRUGSCOPE_CONFIG,
//! then applies `.env` / process environment overrides (DB_HOST, DB_PORT, DB_NAME,
//! DB_USER, DB_PASSWORD, LOG_LEVEL, DRUGSCOPE_BIND).

use std::path::Path;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_PATH_VAR: &str = "DRUGSCOPE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "drugscope.toml";

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("missing required configuration values: {}", .0.join(", "))]
    MissingValues(Vec<&'static str>),

    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },

    #[error("config file not found: {0}")]
    FileNotFound(String),

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ConfigurationError>;

/// Fully validated configuration.
#[derive(Debug)]
pub struct Config {
    pub database: DatabaseConfig,
    pub query: QueryConfig,
    pub pool: PoolSettings,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

/// Connection values for the relational store. All five are required.
#[derive(Debug)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: SecretString,
}

impl DatabaseConfig {
    /// Connection string with the password masked, for logs.
    pub fn redacted_url(&self) -> String {
        format!(
            "postgresql://{}:***@{}:{}/{}",
            self.user, self.host, self.port, self.name
        )
    }

    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Maximum number of search candidates (K).
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
    /// Cap on raw interaction rows fetched per drug.
    #[serde(default = "default_interaction_limit")]
    pub interaction_limit: usize,
    /// Only molecules flagged therapeutic are searchable.
    #[serde(default = "bool_true")]
    pub therapeutic_only: bool,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_timeout_ms")]
    pub probe_timeout_ms: u64,
    /// Issue the three per-drug aggregators concurrently.
    #[serde(default = "bool_true")]
    pub parallel_profile: bool,
}

fn default_search_limit()      -> usize { 10 }
fn default_interaction_limit() -> usize { 50 }
fn default_timeout_ms()        -> u64   { 5_000 }
fn bool_true()                 -> bool  { true }

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            search_limit: default_search_limit(),
            interaction_limit: default_interaction_limit(),
            therapeutic_only: true,
            timeout_ms: default_timeout_ms(),
            probe_timeout_ms: default_timeout_ms(),
            parallel_profile: true,
        }
    }
}

impl QueryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

/// What a checkout does when every pooled connection is in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustionPolicy {
    /// Wait for a connection, giving up before the query timeout.
    Block,
    /// Report the backend unavailable immediately.
    FailFast,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolSettings {
    #[serde(default = "default_pool_size")]
    pub max_size: usize,
    #[serde(default = "default_exhaustion_policy")]
    pub on_exhausted: ExhaustionPolicy,
}

// 5 pooled + 10 overflow connections
fn default_pool_size()         -> usize            { 15 }
fn default_exhaustion_policy() -> ExhaustionPolicy { ExhaustionPolicy::Block }

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_size: default_pool_size(),
            on_exhausted: default_exhaustion_policy(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String { "127.0.0.1:8050".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive; RUST_LOG takes precedence.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String { "info,drugscope=debug".to_string() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: default_log_filter() }
    }
}

// ── Raw file shape ─────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    database: RawDatabase,
    #[serde(default)]
    query: QueryConfig,
    #[serde(default)]
    pool: PoolSettings,
    #[serde(default)]
    server: ServerConfig,
    #[serde(default)]
    logging: LoggingConfig,
}

#[derive(Debug, Default, Deserialize)]
struct RawDatabase {
    host: Option<String>,
    port: Option<u16>,
    name: Option<String>,
    user: Option<String>,
    password: Option<String>,
}

impl Config {
    /// Load `.env`, then the config file (optional unless DRUGSCOPE_CONFIG names it),
    /// then environment overrides.
    pub fn load() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }

        let explicit = std::env::var(CONFIG_PATH_VAR).ok();
        let path = explicit.clone().unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

        let content = if Path::new(&path).exists() {
            Some(std::fs::read_to_string(&path)?)
        } else if explicit.is_some() {
            return Err(ConfigurationError::FileNotFound(path));
        } else {
            None
        };

        Self::from_sources(content.as_deref(), |key| std::env::var(key).ok())
    }

    /// Build a config from optional TOML text and an environment lookup.
    /// Environment values win over file values; empty values count as missing.
    pub fn from_sources<F>(file: Option<&str>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let parsed: FileConfig = match file {
            Some(text) => toml::from_str(text)?,
            None => FileConfig::default(),
        };

        let env_value = |key: &str| env(key).filter(|v| !v.trim().is_empty());
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        let host = env_value("DB_HOST").or_else(|| non_empty(parsed.database.host));
        let name = env_value("DB_NAME").or_else(|| non_empty(parsed.database.name));
        let user = env_value("DB_USER").or_else(|| non_empty(parsed.database.user));
        let password = env_value("DB_PASSWORD").or_else(|| non_empty(parsed.database.password));
        let port = match env_value("DB_PORT") {
            Some(raw) => Some(raw.trim().parse::<u16>().map_err(|e| {
                ConfigurationError::InvalidValue { key: "DB_PORT", reason: e.to_string() }
            })?),
            None => parsed.database.port,
        };

        let mut missing = Vec::new();
        if host.is_none()     { missing.push("DB_HOST"); }
        if port.is_none()     { missing.push("DB_PORT"); }
        if name.is_none()     { missing.push("DB_NAME"); }
        if user.is_none()     { missing.push("DB_USER"); }
        if password.is_none() { missing.push("DB_PASSWORD"); }

        let (Some(host), Some(port), Some(name), Some(user), Some(password)) =
            (host, port, name, user, password)
        else {
            return Err(ConfigurationError::MissingValues(missing));
        };

        let mut logging = parsed.logging;
        if let Some(level) = env_value("LOG_LEVEL") {
            logging.filter = level.trim().to_lowercase();
        }

        let mut server = parsed.server;
        if let Some(bind) = env_value("DRUGSCOPE_BIND") {
            server.bind = bind;
        }

        let config = Config {
            database: DatabaseConfig {
                host,
                port,
                name,
                user,
                password: SecretString::from(password),
            },
            query: parsed.query,
            pool: parsed.pool,
            server,
            logging,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.query.search_limit == 0 {
            return Err(ConfigurationError::InvalidValue {
                key: "query.search_limit",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.query.timeout_ms == 0 || self.query.probe_timeout_ms == 0 {
            return Err(ConfigurationError::InvalidValue {
                key: "query.timeout_ms",
                reason: "backend calls need a bounded, non-zero wait".to_string(),
            });
        }
        let min_pool = if self.query.parallel_profile { 3 } else { 1 };
        if self.pool.max_size < min_pool {
            return Err(ConfigurationError::InvalidValue {
                key: "pool.max_size",
                reason: format!(
                    "must be at least {min_pool} so concurrent aggregators cannot starve each other"
                ),
            });
        }
        Ok(())
    }
}
