use anyhow::Result;
use clap::Parser;

use crate::Opts;
use jotter_server::config::Config;
use jotter_server::database::NoteStore;

/// Print the total number of notes.
#[derive(Debug, Parser)]
pub struct CountNotes {}

pub async fn run(config: Config, _opts: Opts) -> Result<()> {
    let db = super::open_database(&config).await?;
    let count = db.count_notes().await?;

    println!("{}", count);

    Ok(())
}
