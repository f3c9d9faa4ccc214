//! Configuration loading from `.env` files.

use std::{env, path::PathBuf};

use anyhow::{Context, Result};

/// Runtime settings derived from environment variables.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Store root directory, taken from `DATABASE_URL`.
    pub database_url: PathBuf,
    /// HTTP bind address, e.g. `127.0.0.1:7070`.
    pub bind_http: String,
}

impl Settings {
    /// Load settings from the specified `.env` file.
    ///
    /// `DATABASE_URL` is required; any operation needing the store fails at
    /// startup without it. `BIND_HTTP` defaults to `127.0.0.1:7070`.
    pub fn from_env(path: &str) -> Result<Self> {
        dotenvy::from_filename(path).context("reading env file")?;
        let database_url = PathBuf::from(
            env::var("DATABASE_URL").context("DATABASE_URL environment variable is not set")?,
        );
        let bind_http = env::var("BIND_HTTP").unwrap_or_else(|_| "127.0.0.1:7070".into());
        Ok(Self {
            database_url,
            bind_http,
        })
    }
}
