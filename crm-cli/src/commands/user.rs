//! User bootstrap: `crm user create`
//!
//! Every user endpoint needs a token, so the first account is created here.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crm_server::db::repos::{NewUser, UserRepo};
use crm_server::models::{required, Email};
use crm_server::DatabaseConfig;

use super::DbArgs;

#[derive(Parser, Debug)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommand,
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Create a user with a bcrypt-hashed password
    Create(CreateUserArgs),
}

#[derive(Parser, Debug)]
pub struct CreateUserArgs {
    /// Display name
    #[arg(long)]
    pub username: String,

    /// Login email (must be unique)
    #[arg(long)]
    pub email: String,

    /// Plaintext password; prefer the environment variable over the flag
    #[arg(long, env = "CRM_USER_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Role claim carried in issued tokens
    #[arg(long, default_value = "user")]
    pub role: String,
}

impl TryFrom<CreateUserArgs> for NewUser {
    type Error = anyhow::Error;

    fn try_from(args: CreateUserArgs) -> Result<Self> {
        required("username", &args.username)?;
        required("password", &args.password)?;
        required("role", &args.role)?;
        Ok(Self {
            username: args.username,
            email: Email::new(&args.email)?,
            password: args.password,
            role: args.role,
        })
    }
}

pub async fn run_user(args: UserArgs, db: &DbArgs) -> Result<()> {
    match args.command {
        UserCommand::Create(create) => {
            let new = NewUser::try_from(create)?;

            let config = DatabaseConfig::from_env().context("Invalid database configuration")?;
            let pool = db.connect(&config).await?;

            let user = UserRepo::new(&pool)
                .create(new)
                .await
                .context("Failed to create user")?;
            println!("Created user {} ({}) with role {}", user.username, user.id, user.role);

            pool.close().await;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> CreateUserArgs {
        CreateUserArgs {
            username: "admin".into(),
            email: "admin@example.com".into(),
            password: "changeme".into(),
            role: "admin".into(),
        }
    }

    #[test]
    fn valid_args_convert() {
        let new = NewUser::try_from(args()).unwrap();
        assert_eq!(new.email.as_str(), "admin@example.com");
    }

    #[test]
    fn invalid_email_is_rejected_before_connecting() {
        let err = NewUser::try_from(CreateUserArgs {
            email: "admin".into(),
            ..args()
        })
        .unwrap_err();
        assert!(err.to_string().contains("email"));
    }
}
