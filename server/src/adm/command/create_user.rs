use anyhow::{anyhow, Result};
use clap::Parser;

use crate::Opts;
use jotter::user::{Username, MIN_PASSWORD_LENGTH};
use jotter_server::config::Config;
use jotter_server::database::queries;
use jotter_server::password::hash_password;

/// Create a user.
///
/// Example:
/// $ JOTTER_PASSWORD=hunter2hunter2 jotteradm create-user alice
#[derive(Debug, Parser)]
pub struct CreateUser {
    /// The username.
    username: String,

    /// The password.
    #[clap(long, env = "JOTTER_PASSWORD", hide_env_values = true)]
    password: String,
}

pub async fn run(config: Config, opts: Opts) -> Result<()> {
    let sub = opts.command.as_create_user().unwrap();

    let username: Username = sub.username.parse()?;

    if sub.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(anyhow!(
            "The password must contain at least {} characters",
            MIN_PASSWORD_LENGTH
        ));
    }

    let db = super::open_database(&config).await?;
    let password_hash = hash_password(&sub.password)?;
    let user = queries::create_user(&db, &username, &password_hash).await?;

    eprintln!("Created user {} (ID {})", user.username, user.id);

    Ok(())
}
