//! Service configuration - environment loading
//!
//! Configuration is read once at startup:
//! - `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD`, `DB_NAME`, `DB_SSLMODE`
//! - `PORT`: listen port (default: 8080)
//! - `APP_MODE`: `release` or `debug` (default: debug)
//! - `JWT_SECRET`: token signing secret (required)
//! - `CORS_PERMISSIVE`: allow any origin (default: false)

use std::net::SocketAddr;
use std::str::FromStr;

use sqlx::postgres::{PgConnectOptions, PgSslMode};

use crate::http::ServerConfig;

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be set")]
    Missing { name: &'static str },

    #[error("invalid {name} value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// PostgreSQL connection parameters
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub ssl_mode: PgSslMode,
}

impl DatabaseConfig {
    /// Read connection parameters through `lookup`, applying defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_owned());

        let port_raw = var("DB_PORT", "5432");
        let port = port_raw.parse().map_err(|_| ConfigError::Invalid {
            name: "DB_PORT",
            value: port_raw.clone(),
        })?;

        let ssl_raw = var("DB_SSLMODE", "disable");
        let ssl_mode = PgSslMode::from_str(&ssl_raw).map_err(|_| ConfigError::Invalid {
            name: "DB_SSLMODE",
            value: ssl_raw.clone(),
        })?;

        Ok(Self {
            host: var("DB_HOST", "localhost"),
            port,
            user: var("DB_USER", "core"),
            password: var("DB_PASSWORD", "core"),
            name: var("DB_NAME", "crm"),
            ssl_mode,
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build sqlx connect options without formatting a connection string.
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.name)
            .ssl_mode(self.ssl_mode)
    }
}

/// Complete service configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt_secret: String,
    /// `APP_MODE=release`: quieter default logging
    pub release_mode: bool,
}

impl AppConfig {
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database = DatabaseConfig::from_lookup(&lookup)?;

        let port_raw = lookup("PORT").unwrap_or_else(|| "8080".to_owned());
        let port: u16 = port_raw.parse().map_err(|_| ConfigError::Invalid {
            name: "PORT",
            value: port_raw.clone(),
        })?;

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing { name: "JWT_SECRET" })?;

        let release_mode = lookup("APP_MODE").is_some_and(|m| m == "release");
        let cors_permissive = lookup("CORS_PERMISSIVE").is_some_and(|v| v == "1" || v == "true");

        Ok(Self {
            database,
            server: ServerConfig {
                bind_addr: SocketAddr::from(([0, 0, 0, 0], port)),
                cors_permissive,
            },
            jwt_secret,
            release_mode,
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn database_defaults() {
        let db = DatabaseConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(db.host, "localhost");
        assert_eq!(db.port, 5432);
        assert_eq!(db.user, "core");
        assert_eq!(db.name, "crm");
        assert!(matches!(db.ssl_mode, PgSslMode::Disable));
    }

    #[test]
    fn rejects_bad_port() {
        let err = DatabaseConfig::from_lookup(lookup(&[("DB_PORT", "fivefour")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "DB_PORT", .. }));
    }

    #[test]
    fn rejects_unknown_sslmode() {
        let err = DatabaseConfig::from_lookup(lookup(&[("DB_SSLMODE", "sometimes")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "DB_SSLMODE", .. }));
    }

    #[test]
    fn jwt_secret_is_required() {
        let err = AppConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { name: "JWT_SECRET" }));

        let err = AppConfig::from_lookup(lookup(&[("JWT_SECRET", "")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { .. }));
    }

    #[test]
    fn app_config_from_vars() {
        let config = AppConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "s3cret"),
            ("PORT", "9090"),
            ("APP_MODE", "release"),
            ("DB_SSLMODE", "require"),
        ]))
        .unwrap();

        assert_eq!(config.server.bind_addr.port(), 9090);
        assert!(config.release_mode);
        assert!(!config.server.cors_permissive);
        assert!(matches!(config.database.ssl_mode, PgSslMode::Require));
    }
}
