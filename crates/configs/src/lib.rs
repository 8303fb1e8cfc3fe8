//! # configs
//!
//! Layered settings: built-in defaults, then an optional
//! `config/hearth.toml`, then `HEARTH_*` environment variables
//! (`HEARTH_DATABASE__URL`, `HEARTH_IDENTITY__SECRET`, ...).
//!
//! `identity.secret` has no default; loading fails until one is provided.

use config::{Config, Environment, File};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::info;

pub const ENV_PREFIX: &str = "HEARTH";
pub const DEFAULT_CONFIG_FILE: &str = "config/hearth";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub identity: IdentitySettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// sqlx connection string, e.g. `sqlite://hearth.db` or `sqlite::memory:`
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize)]
pub struct IdentitySettings {
    /// HS256 key shared with the identity provider
    #[serde(deserialize_with = "secret_string")]
    pub secret: SecretString,
    pub issuer: Option<String>,
    pub leeway_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// `EnvFilter` directives; `RUST_LOG` wins when set
    pub filter: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

fn secret_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SecretString, D::Error> {
    String::deserialize(deserializer).map(SecretString::from)
}

impl Settings {
    /// Loads `.env`, then the default file and process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_sources(Some(DEFAULT_CONFIG_FILE), Environment::with_prefix(ENV_PREFIX))
    }

    pub fn from_sources(file: Option<&str>, env: Environment) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("database.url", "sqlite://hearth.db")?
            .set_default("database.max_connections", 5)?
            .set_default("identity.leeway_secs", 30)?
            .set_default("log.filter", "info,sqlx=warn,tower_http=debug")?
            .set_default("log.format", "pretty")?;

        if let Some(file) = file {
            builder = builder.add_source(File::with_name(file).required(false));
        }

        let settings: Settings = builder
            .add_source(env.prefix_separator("_").separator("__").try_parsing(true))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.identity.secret.expose_secret().trim().is_empty() {
            return Err(ConfigError::Invalid("identity.secret must not be empty".into()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid("database.max_connections must be at least 1".into()));
        }
        Ok(())
    }

    /// Logs the effective, non-secret settings. Call once tracing is up.
    pub fn announce(&self) {
        info!(
            address = %self.server.address(),
            database = %self.database.url,
            max_connections = self.database.max_connections,
            issuer = self.identity.issuer.as_deref().unwrap_or("-"),
            "configuration loaded"
        );
    }
}
