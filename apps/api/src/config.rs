use std::time::Duration;

use anyhow::{Context, Result};

use crate::export::DEFAULT_SETTLE;

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub port: u16,
    pub rust_log: String,
    /// Without a key, CVs reuse the profile's own summary.
    pub anthropic_api_key: Option<String>,
    /// Without a render service, PDF export is unavailable.
    pub render_service_url: Option<String>,
    pub export_settle: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            jwt_secret: require_env("JWT_SECRET")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            render_service_url: optional_env("RENDER_SERVICE_URL"),
            export_settle: match optional_env("EXPORT_SETTLE_MS") {
                Some(ms) => Duration::from_millis(
                    ms.parse::<u64>()
                        .context("EXPORT_SETTLE_MS must be a whole number of milliseconds")?,
                ),
                None => DEFAULT_SETTLE,
            },
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Unset and blank are treated the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
