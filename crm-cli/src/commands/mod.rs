//! Command implementations for the crm CLI

pub mod migrate;
pub mod serve;
pub mod user;

pub use migrate::run_migrate;
pub use serve::run_serve;
pub use user::run_user;

use anyhow::{Context, Result};
use clap::Args;
use sqlx::postgres::PgConnectOptions;
use sqlx::PgPool;

use crm_server::db;
use crm_server::DatabaseConfig;

/// Database selection shared by every command
#[derive(Args, Debug, Clone)]
pub struct DbArgs {
    /// Full connection URL; when unset, DB_HOST/DB_PORT/DB_USER/DB_PASSWORD/DB_NAME/DB_SSLMODE are used
    #[arg(long, env = "DATABASE_URL", global = true)]
    pub database_url: Option<String>,
}

impl DbArgs {
    /// Connection options from `--database-url` or the DB_* variables.
    pub fn connect_options(&self, fallback: &DatabaseConfig) -> Result<PgConnectOptions> {
        match &self.database_url {
            Some(url) => url.parse().context("invalid DATABASE_URL"),
            None => Ok(fallback.connect_options()),
        }
    }

    /// Connect with the startup retry policy.
    pub async fn connect(&self, fallback: &DatabaseConfig) -> Result<PgPool> {
        let options = self.connect_options(fallback)?;
        db::connect(&options)
            .await
            .context("Failed to connect to database")
    }
}
