//! Application settings.
//!
//! Settings come from three layers, later ones winning: built-in defaults, an
//! optional TOML file (path in `FOWLTRAK_CONFIG`), and environment variables.
//! `SECRET_KEY` is only ever read from the environment and is mandatory: it
//! signs the session cookie, so starting without one is a fatal error.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::{fmt, path::Path};

/// Default listen address for the HTTP server
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:5000";
/// Default bcrypt work factor
pub const DEFAULT_BCRYPT_COST: u32 = 12;
/// Smallest work factor bcrypt accepts
pub const MIN_BCRYPT_COST: u32 = 4;
/// Largest work factor bcrypt accepts
pub const MAX_BCRYPT_COST: u32 = 31;
/// Default name of the session cookie
pub const DEFAULT_COOKIE_NAME: &str = "fowltrak_session";

/// Contents of the optional TOML settings file
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerSection,
    /// Credential settings
    #[serde(default)]
    pub auth: AuthSection,
    /// Session cookie settings
    #[serde(default)]
    pub session: SessionSection,
}

/// `[server]` table
#[derive(Debug, Default, Deserialize)]
pub struct ServerSection {
    pub bind_address: Option<String>,
}

/// `[auth]` table
#[derive(Debug, Default, Deserialize)]
pub struct AuthSection {
    pub bcrypt_cost: Option<u32>,
}

/// `[session]` table
#[derive(Debug, Default, Deserialize)]
pub struct SessionSection {
    pub cookie_name: Option<String>,
}

/// Resolved application configuration, built once at startup
#[derive(Clone)]
pub struct AppConfig {
    /// Key used to sign session cookies
    pub secret_key: String,
    /// `SeaORM` connection string
    pub database_url: String,
    /// Address the HTTP server listens on
    pub bind_address: String,
    /// bcrypt work factor for new password hashes
    pub bcrypt_cost: u32,
    /// Name of the session cookie
    pub cookie_name: String,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("secret_key", &"<redacted>")
            .field("database_url", &self.database_url)
            .field("bind_address", &self.bind_address)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("cookie_name", &self.cookie_name)
            .finish()
    }
}

impl AppConfig {
    /// Loads the configuration from the process environment and, when
    /// `FOWLTRAK_CONFIG` names one, a TOML file.
    pub fn load() -> Result<Self> {
        let file = match std::env::var("FOWLTRAK_CONFIG") {
            Ok(path) => load_file_config(path)?,
            Err(_) => FileConfig::default(),
        };
        Self::from_sources(file, |key| std::env::var(key).ok())
    }

    /// Merges a parsed file with an environment lookup.
    pub fn from_sources<F>(file: FileConfig, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret_key = env("SECRET_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| Error::Config {
                message: "SECRET_KEY environment variable not set".to_string(),
            })?;

        let database_url =
            env("DATABASE_URL").unwrap_or_else(|| super::database::DEFAULT_DATABASE_URL.to_string());

        let bind_address = env("BIND_ADDRESS")
            .or(file.server.bind_address)
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let bcrypt_cost = match env("BCRYPT_COST") {
            Some(raw) => raw.trim().parse::<u32>().map_err(|e| Error::Config {
                message: format!("BCRYPT_COST must be an integer: {e}"),
            })?,
            None => file.auth.bcrypt_cost.unwrap_or(DEFAULT_BCRYPT_COST),
        };
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&bcrypt_cost) {
            return Err(Error::Config {
                message: format!(
                    "bcrypt cost {bcrypt_cost} outside {MIN_BCRYPT_COST}..={MAX_BCRYPT_COST}"
                ),
            });
        }

        let cookie_name = file
            .session
            .cookie_name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_COOKIE_NAME.to_string());

        Ok(Self {
            secret_key,
            database_url,
            bind_address,
            bcrypt_cost,
            cookie_name,
        })
    }
}

/// Loads the optional settings file.
///
/// # Errors
/// Returns an error if the file cannot be read or is not valid TOML.
pub fn load_file_config<P: AsRef<Path>>(path: P) -> Result<FileConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config file {}: {e}", path_ref.display()),
    })
}
