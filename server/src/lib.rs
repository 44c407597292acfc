#![deny(
    asm_sub_register,
    deprecated,
    missing_abi,
    unsafe_code,
    unused_macros,
    unused_must_use,
    unused_unsafe
)]
#![deny(clippy::from_str_radix_10, clippy::let_underscore_future)]

pub mod access;
mod api;
pub mod config;
pub mod database;
mod error;
pub mod gc;
mod middleware;
pub mod password;

#[cfg(test)]
mod tests;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{extract::Extension, Router};
use tokio::net::TcpListener;
use tokio::sync::OnceCell;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use config::Config;
use database::DbConnection;
pub use error::{ErrorKind, ServerError, ServerResult};
use middleware::restrict_host;

type State = Arc<StateInner>;

/// Global server state.
#[derive(Debug)]
pub struct StateInner {
    /// The Jotter Server configuration.
    config: Config,

    /// Handle to the database.
    database: OnceCell<Arc<DbConnection>>,
}

impl StateInner {
    async fn new(config: Config) -> State {
        Arc::new(Self {
            config,
            database: OnceCell::new(),
        })
    }

    /// Returns a handle to the database.
    async fn database(&self) -> ServerResult<&Arc<DbConnection>> {
        self.database
            .get_or_try_init(|| async {
                DbConnection::connect(&self.config.database)
                    .await
                    .map_err(|e| ErrorKind::DatabaseError(e).into())
            })
            .await
    }
}

/// Builds the application with all middleware applied.
fn build_router(state: State) -> Result<Router> {
    let router = api::get_router(state.clone())?
        .layer(axum::middleware::from_fn(restrict_host))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new());

    Ok(router)
}

/// Runs the API server.
pub async fn run_api_server(cli_listen: Option<SocketAddr>, config: Config) -> Result<()> {
    eprintln!("Starting API server...");

    let state = StateInner::new(config).await;

    let listen = if let Some(cli_listen) = cli_listen {
        cli_listen
    } else {
        state.config.listen.to_owned()
    };

    let router = build_router(state)?;

    eprintln!("Listening on {:?}...", listen);

    let listener = TcpListener::bind(&listen).await?;

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Runs database migrations.
pub async fn run_migrations(config: Config) -> Result<()> {
    eprintln!("Running migrations...");

    let state = StateInner::new(config).await;
    let db = state.database().await?;
    database::migrations::run_migrations(db).await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }

    tracing::info!("Shutting down...");
}
