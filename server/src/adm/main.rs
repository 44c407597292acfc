mod command;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use enum_as_inner::EnumAsInner;

use command::count_notes::{self, CountNotes};
use command::create_user::{self, CreateUser};
use jotter_server::config;

/// Jotter server administration utilities.
#[derive(Debug, Parser)]
#[clap(version)]
#[clap(propagate_version = true)]
pub struct Opts {
    /// Path to the config file.
    #[clap(short = 'f', long, global = true)]
    config: Option<PathBuf>,

    /// The sub-command.
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, EnumAsInner)]
pub enum Command {
    CreateUser(CreateUser),
    CountNotes(CountNotes),
}

#[tokio::main]
async fn main() -> Result<()> {
    let opts = Opts::parse();
    let config = config::load_config(opts.config.as_deref()).await?;

    match opts.command {
        Command::CreateUser(_) => create_user::run(config, opts).await?,
        Command::CountNotes(_) => count_notes::run(config, opts).await?,
    }

    Ok(())
}
