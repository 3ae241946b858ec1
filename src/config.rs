use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use anyhow::{Context, Result};

/// The application's configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// The URL of the PostgreSQL database.
    pub database_url: String,
    /// The address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// The directory uploaded media is stored in.
    pub media_dir: PathBuf,
    /// The largest accepted upload body in bytes.
    pub max_upload_bytes: usize,
    /// Whether cookies are marked `Secure`.
    pub secure_cookies: bool,
    /// Replenish rate of the register/login limiter.
    pub auth_rate_per_second: u64,
    /// Burst size of the register/login limiter.
    pub auth_burst: u32,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        let is_production = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string()) == "production";

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .context("DATABASE_URL must be set")?,
            bind_addr: env::var("BIND_ADDR")
                .unwrap_or_else(|_| "127.0.0.1:8008".to_string())
                .parse()
                .context("Invalid BIND_ADDR")?,
            media_dir: env::var("MEDIA_DIR")
                .unwrap_or_else(|_| "media".to_string())
                .into(),
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .unwrap_or_else(|_| (64 * 1024 * 1024).to_string())
                .parse()
                .context("Invalid MAX_UPLOAD_BYTES")?,
            secure_cookies: is_production,
            auth_rate_per_second: env::var("AUTH_RATE_PER_SECOND")
                .unwrap_or_else(|_| "1".to_string())
                .parse()
                .context("Invalid AUTH_RATE_PER_SECOND")?,
            auth_burst: env::var("AUTH_BURST")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .context("Invalid AUTH_BURST")?,
        })
    }
}
