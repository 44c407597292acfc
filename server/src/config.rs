//! Server configuration.

use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Result};
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};
use serde::Deserialize;
use xdg::BaseDirectories;

/// Application prefix in XDG base directories.
///
/// This will be concatenated into `$XDG_CONFIG_HOME/jotter`.
const XDG_PREFIX: &str = "jotter";

/// Environment variable storing the Base64-encoded TOML configuration.
///
/// This is useful for deploying to certain application platforms.
const ENV_CONFIG_BASE64: &str = "JOTTER_SERVER_CONFIG_BASE64";

/// Default listen address.
const DEFAULT_LISTEN: &str = "[::]:8080";

/// Configuration for the Jotter server.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Socket address to listen on.
    #[serde(default = "default_listen_address")]
    pub listen: SocketAddr,

    /// Allowed `Host` headers.
    ///
    /// This _must_ be configured for production use. If unconfigured or the
    /// list is empty, all `Host` headers are allowed.
    #[serde(rename = "allowed-hosts")]
    #[serde(default = "Vec::new")]
    pub allowed_hosts: Vec<String>,

    /// Database connection.
    pub database: DatabaseConfig,

    /// Session and cookie settings.
    #[serde(default = "Default::default")]
    pub session: SessionConfig,
}

/// Database connection configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Connection URL.
    ///
    /// Either `sqlite://<path>` or a bare path.
    #[serde(default = "default_database_url")]
    pub url: String,
}

/// Session configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// How long a login lasts.
    #[serde(with = "humantime_serde", default = "default_session_duration")]
    pub duration: Duration,

    /// Base64-encoded key for encrypting session cookies.
    ///
    /// Must decode to at least 64 bytes. If unset, a random key is
    /// generated on startup and sessions do not survive restarts.
    #[serde(rename = "cookie-key-base64")]
    pub cookie_key_base64: Option<String>,

    /// Whether the session cookie is marked `Secure`.
    ///
    /// Disable only for plain-HTTP development setups.
    #[serde(rename = "secure-cookie", default = "default_secure_cookie")]
    pub secure_cookie: bool,

    /// How often expired sessions are purged.
    ///
    /// Zero disables the periodic cleanup.
    #[serde(
        rename = "cleanup-interval",
        with = "humantime_serde",
        default = "default_cleanup_interval"
    )]
    pub cleanup_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration: default_session_duration(),
            cookie_key_base64: None,
            secure_cookie: default_secure_cookie(),
            cleanup_interval: default_cleanup_interval(),
        }
    }
}

impl DatabaseConfig {
    /// Returns the filesystem path of the database.
    pub fn path(&self) -> &str {
        self.url
            .strip_prefix("sqlite://")
            .or_else(|| self.url.strip_prefix("sqlite:"))
            .unwrap_or(&self.url)
    }
}

impl SessionConfig {
    /// Decodes the configured cookie key, if any.
    pub fn cookie_key(&self) -> Result<Option<Vec<u8>>> {
        let Some(key_b64) = &self.cookie_key_base64 else {
            return Ok(None);
        };

        let key = BASE64_STANDARD
            .decode(key_b64)
            .map_err(|e| anyhow!("cookie-key-base64 is not valid Base64: {}", e))?;

        if key.len() < 64 {
            return Err(anyhow!(
                "cookie-key-base64 must decode to at least 64 bytes, got {}",
                key.len()
            ));
        }

        Ok(Some(key))
    }
}

fn default_listen_address() -> SocketAddr {
    DEFAULT_LISTEN.parse().unwrap()
}

fn default_database_url() -> String {
    let db_path = get_xdg_base_dirs()
        .create_data_directory("")
        .map(|p| p.join("server.db"))
        .unwrap_or_else(|_| PathBuf::from("jotter.db"));

    format!("sqlite://{}", db_path.display())
}

fn default_session_duration() -> Duration {
    Duration::from_secs(14 * 24 * 60 * 60)
}

fn default_secure_cookie() -> bool {
    true
}

fn default_cleanup_interval() -> Duration {
    Duration::from_secs(60 * 60)
}

/// Loads the configuration in the standard order.
///
/// An explicit path wins, then `JOTTER_SERVER_CONFIG_BASE64`, then
/// `$XDG_CONFIG_HOME/jotter/server.toml`.
pub async fn load_config(config_path: Option<&Path>) -> Result<Config> {
    if let Some(config_path) = config_path {
        load_config_from_path(config_path).await
    } else if let Ok(config_env) = env::var(ENV_CONFIG_BASE64) {
        tracing::info!("Using configurations from environment variable");
        let decoded = String::from_utf8(BASE64_STANDARD.decode(config_env.as_bytes())?)?;
        load_config_from_str(&decoded)
    } else {
        let config_path = get_xdg_config_path()?;
        load_config_from_path(&config_path).await
    }
}

pub async fn load_config_from_path(path: &Path) -> Result<Config> {
    tracing::info!("Using configurations: {:?}", path);

    let config = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| anyhow!("Failed to read {}: {}", path.display(), e))?;
    load_config_from_str(&config)
}

pub fn load_config_from_str(s: &str) -> Result<Config> {
    let config: Config = toml::from_str(s)?;
    config.session.cookie_key()?;
    Ok(config)
}

fn get_xdg_config_path() -> Result<PathBuf> {
    let xdg_dirs = get_xdg_base_dirs();
    let config_path = xdg_dirs.place_config_file("server.toml")?;
    Ok(config_path)
}

fn get_xdg_base_dirs() -> BaseDirectories {
    BaseDirectories::with_prefix(XDG_PREFIX)
}
