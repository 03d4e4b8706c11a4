//! Schema commands: `crm migrate up` / `crm migrate down --yes`

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use crm_server::db::migrations;
use crm_server::DatabaseConfig;

use super::DbArgs;

#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub command: MigrateCommand,
}

#[derive(Subcommand, Debug)]
pub enum MigrateCommand {
    /// Create missing tables and indexes
    Up,
    /// Drop every CRM table (destroys data)
    Down {
        /// Confirm the drop
        #[arg(long)]
        yes: bool,
    },
}

pub async fn run_migrate(args: MigrateArgs, db: &DbArgs) -> Result<()> {
    if let MigrateCommand::Down { yes: false } = args.command {
        bail!("Refusing to drop tables without --yes");
    }

    let config = DatabaseConfig::from_env().context("Invalid database configuration")?;
    let pool = db.connect(&config).await?;

    match args.command {
        MigrateCommand::Up => {
            migrations::run(&pool).await.context("Migration up failed")?;
            println!("Successfully ran migration up");
        }
        MigrateCommand::Down { .. } => {
            migrations::drop_all(&pool)
                .await
                .context("Migration down failed")?;
            println!("Successfully ran migration down");
        }
    }

    pool.close().await;
    Ok(())
}
