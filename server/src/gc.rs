//! Expired session cleanup.

use std::time::Duration;

use anyhow::Result;
use tokio::time;
use tracing::instrument;

use super::{State, StateInner};
use crate::config::Config;
use crate::database::queries;

/// Purges expired sessions periodically.
pub async fn run_session_cleanup(config: Config) {
    let interval = config.session.cleanup_interval;

    if interval == Duration::ZERO {
        // disabled
        return;
    }

    let state = StateInner::new(config).await;

    loop {
        // We don't stop even if it errors
        if let Err(e) = run_session_cleanup_with_state(&state).await {
            tracing::warn!("Session cleanup failed: {}", e);
        }

        time::sleep(interval).await;
    }
}

/// Purges expired sessions once.
pub async fn run_session_cleanup_once(config: Config) -> Result<u64> {
    let state = StateInner::new(config).await;
    run_session_cleanup_with_state(&state).await
}

#[instrument(skip_all)]
async fn run_session_cleanup_with_state(state: &State) -> Result<u64> {
    tracing::info!("Purging expired sessions...");

    let db = state.database().await?;
    let deleted = queries::delete_expired_sessions(db).await?;

    tracing::info!("Deleted {} expired sessions", deleted);

    Ok(deleted)
}
