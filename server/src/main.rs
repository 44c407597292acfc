use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing_error::ErrorLayer;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use jotter_server::config;
use jotter_server::gc;

/// Jotter notes server.
#[derive(Debug, Parser)]
#[clap(version)]
#[clap(propagate_version = true)]
struct Opts {
    /// Path to the config file.
    #[clap(short = 'f', long)]
    config: Option<PathBuf>,

    /// Socket address to listen on.
    ///
    /// This overrides `listen` in the config.
    #[clap(short = 'l', long)]
    listen: Option<SocketAddr>,

    /// Mode to run.
    #[clap(long, default_value = "monolithic")]
    mode: ServerMode,

    /// Emit logs as JSON lines.
    #[clap(long)]
    json_logs: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ServerMode {
    /// Run all components.
    Monolithic,

    /// Run the API server.
    ApiServer,

    /// Run database migrations then exit.
    DbMigrations,

    /// Purge expired sessions then exit.
    SessionCleanupOnce,

    /// Check the configuration then exit.
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let opts = Opts::parse();

    init_logging(opts.json_logs);
    dump_version();

    let config = config::load_config(opts.config.as_deref()).await?;

    match opts.mode {
        ServerMode::Monolithic => {
            jotter_server::run_migrations(config.clone()).await?;

            // The sweep loops forever, so the server decides when we exit
            let sweep = !config.session.cleanup_interval.is_zero();

            tokio::select! {
                api_server = jotter_server::run_api_server(opts.listen, config.clone()) => api_server?,
                _ = gc::run_session_cleanup(config.clone()), if sweep => {}
            }
        }
        ServerMode::ApiServer => {
            jotter_server::run_api_server(opts.listen, config).await?;
        }
        ServerMode::DbMigrations => {
            jotter_server::run_migrations(config).await?;
        }
        ServerMode::SessionCleanupOnce => {
            gc::run_session_cleanup_once(config).await?;
        }
        ServerMode::CheckConfig => {
            // config is valid, let's just exit :)
            eprintln!("The configuration is valid.");
        }
    }

    Ok(())
}

fn init_logging(json_logs: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (json_layer, text_layer) = if json_logs {
        (Some(fmt::layer().json()), None)
    } else {
        (None, Some(fmt::layer()))
    };

    let error_layer = ErrorLayer::default();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(error_layer)
        .init();
}

fn dump_version() {
    #[cfg(debug_assertions)]
    eprintln!("Jotter Server {} (debug)", env!("CARGO_PKG_VERSION"));

    #[cfg(not(debug_assertions))]
    eprintln!("Jotter Server {} (release)", env!("CARGO_PKG_VERSION"));
}
