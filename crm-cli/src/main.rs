//! crm CLI - entry point for the CRM core service
//!
//! - `crm serve`: run the HTTP API
//! - `crm migrate up|down`: create or drop the schema
//! - `crm user create`: bootstrap a login
//!
//! A `.env` file in the working directory is loaded before arguments are
//! parsed, so every `env = ...` fallback can come from it.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod tracing_setup;

use commands::{DbArgs, migrate::MigrateArgs, serve::ServeArgs, user::UserArgs};
use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "crm",
    author,
    version,
    about = "CRM core service: accounts, contacts, opportunities and notes over PostgreSQL"
)]
struct Cli {
    /// Debug logging regardless of APP_MODE
    #[arg(long, global = true)]
    debug: bool,

    #[command(flatten)]
    db: DbArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(ServeArgs),
    /// Create or drop the database schema
    Migrate(MigrateArgs),
    /// Manage users (bootstrap logins)
    User(UserArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let app_mode = std::env::var("APP_MODE").ok();
    tracing_setup::init(&TracingConfig::resolve(cli.debug, app_mode.as_deref())).ok();

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args, &cli.db).await?,
        Commands::Migrate(args) => commands::run_migrate(args, &cli.db).await?,
        Commands::User(args) => commands::run_user(args, &cli.db).await?,
    }
    Ok(())
}
