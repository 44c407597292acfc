pub mod count_notes;
pub mod create_user;

use std::sync::Arc;

use anyhow::Result;

use jotter_server::config::Config;
use jotter_server::database::migrations::run_migrations;
use jotter_server::database::DbConnection;

/// Opens the database, bringing the schema up to date.
async fn open_database(config: &Config) -> Result<Arc<DbConnection>> {
    let db = DbConnection::connect(&config.database).await?;
    run_migrations(&db).await?;
    Ok(db)
}
