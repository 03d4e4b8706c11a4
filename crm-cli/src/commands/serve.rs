//! HTTP server command
//!
//! Connects to PostgreSQL (with retry), bootstraps the schema and serves the
//! CRM API until Ctrl+C or SIGTERM.

use anyhow::{Context, Result};
use clap::Parser;

use crm_server::db::migrations;
use crm_server::{run_server, AppConfig, AppState};

use super::DbArgs;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Port to listen on (all interfaces)
    #[arg(long, short = 'p', env = "PORT")]
    pub port: Option<u16>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Skip the schema bootstrap at startup
    #[arg(long)]
    pub skip_migrations: bool,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, db: &DbArgs) -> Result<()> {
    let mut config = AppConfig::from_env().context("Invalid configuration")?;
    if let Some(port) = args.port {
        config.server.bind_addr.set_port(port);
    }
    config.server.cors_permissive |= args.cors_permissive;

    tracing::info!(
        bind = %config.server.bind_addr,
        release = config.release_mode,
        "Starting CRM server"
    );

    let pool = db.connect(&config.database).await?;

    if args.skip_migrations {
        tracing::info!("Skipping schema bootstrap");
    } else {
        migrations::run(&pool)
            .await
            .context("Failed to bootstrap database schema")?;
    }

    let state = AppState::new(pool.clone(), &config.jwt_secret);

    run_server(state, config.server)
        .await
        .context("Server error")?;

    pool.close().await;
    Ok(())
}
