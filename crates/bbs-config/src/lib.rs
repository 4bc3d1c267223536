//! # bbs-config
//!
//! Layered settings for the BBS binaries.
//!
//! Sources, lowest to highest priority:
//! 1. built-in defaults
//! 2. an optional `bbs.toml` (or `.yaml`/`.json`) in the working directory
//! 3. `BBS__SECTION__KEY` environment variables, e.g. `BBS__SERVER__PORT=9000`
//!
//! A `.env` file is loaded into the process environment before step 3.

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid setting: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub pagination: PaginationSettings,
    /// env_logger filter used when `RUST_LOG` is unset.
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PaginationSettings {
    pub default_size: u32,
    pub max_size: u32,
}

fn env_source() -> Environment {
    Environment::with_prefix("BBS")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

impl Settings {
    /// Loads `.env`, then the layered sources.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_sources(Some("bbs"), env_source())
    }

    fn from_sources(file: Option<&str>, env: Environment) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("database.url", "sqlite:bbs.db")?
            .set_default("pagination.default_size", 10)?
            .set_default("pagination.max_size", 100)?
            .set_default("log_level", "info")?;

        if let Some(name) = file {
            builder = builder.add_source(File::with_name(name).required(false));
        }

        let settings: Settings = builder.add_source(env).build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.pagination;
        if p.max_size == 0 {
            return Err(ConfigError::Invalid("pagination.max_size must be positive".into()));
        }
        if p.default_size == 0 || p.default_size > p.max_size {
            return Err(ConfigError::Invalid(format!(
                "pagination.default_size must be between 1 and {}",
                p.max_size
            )));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> (String, u16) {
        (self.server.host.clone(), self.server.port)
    }
}
