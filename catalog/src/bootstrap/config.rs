//! Process configuration loaded from the environment.
//!
//! Environment variables:
//! - DATABASE_URL: connection string (required by the database store)
//! - DB_MAX_CONNECTIONS / DB_MIN_CONNECTIONS: pool bounds (default: 10 / 1)
//! - DB_CONNECT_TIMEOUT_SECS: default 8
//! - DB_IDLE_TIMEOUT_SECS: default 300
//! - DB_MAX_LIFETIME_SECS: default 1800
//! - DB_LOGGING_ENABLED: log every SQL statement (default: false)
//! - CATALOG_STORE: "database" or "memory" (default: database)

use std::str::FromStr;
use std::time::Duration;

use errors::AppError;

use crate::utils::env::{env_bool, env_duration_secs, env_string, env_string_opt, env_u32};

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
    pub logging_enabled: bool,
}

impl DbConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let url = env_string_opt("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| AppError::Config("DATABASE_URL must be set".to_string()))?;

        let max_connections = env_u32("DB_MAX_CONNECTIONS", 10);
        let min_connections = env_u32("DB_MIN_CONNECTIONS", 1);
        if min_connections > max_connections {
            return Err(AppError::Config(format!(
                "DB_MIN_CONNECTIONS ({}) exceeds DB_MAX_CONNECTIONS ({})",
                min_connections, max_connections
            )));
        }

        Ok(Self {
            url,
            max_connections,
            min_connections,
            connect_timeout: env_duration_secs("DB_CONNECT_TIMEOUT_SECS", 8),
            idle_timeout: env_duration_secs("DB_IDLE_TIMEOUT_SECS", 300),
            max_lifetime: env_duration_secs("DB_MAX_LIFETIME_SECS", 1800),
            logging_enabled: env_bool("DB_LOGGING_ENABLED", false),
        })
    }
}

/// Which [`ContentStore`](crate::modules::catalog::ContentStore) variant to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreKind {
    #[default]
    Database,
    Memory,
}

impl FromStr for StoreKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "database" | "db" => Ok(Self::Database),
            "memory" | "mem" => Ok(Self::Memory),
            other => Err(AppError::Config(format!(
                "unknown CATALOG_STORE '{}', expected 'database' or 'memory'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// `None` when the memory store is selected.
    pub db: Option<DbConfig>,
    pub store: StoreKind,
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let store = env_string("CATALOG_STORE", "database").parse()?;
        let db = match store {
            StoreKind::Database => Some(DbConfig::from_env()?),
            StoreKind::Memory => None,
        };

        Ok(Self { db, store })
    }
}
