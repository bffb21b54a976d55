use std::time::Duration;

use whaileys_client::{WhaileysConfig, DEFAULT_API_URL};
use whaileys_db::models::api_config::ApiConfig;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development except
/// `JWT_SECRET`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for background tasks, in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Session token configuration.
    pub jwt: JwtConfig,
    /// Mark the session cookie `Secure` (default: `false`).
    pub cookie_secure: bool,
    /// Session status poll interval in seconds; `0` disables the watcher.
    pub status_poll_interval_secs: u64,
    /// External session API settings from the environment.
    pub session_api: SessionApiSettings,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                 |
    /// |-----------------------------|-------------------------|
    /// | `HOST`                      | `0.0.0.0`               |
    /// | `PORT`                      | `3000`                  |
    /// | `CORS_ORIGINS`              | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`      | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS`     | `30`                    |
    /// | `COOKIE_SECURE`             | `false`                 |
    /// | `STATUS_POLL_INTERVAL_SECS` | `30`                    |
    ///
    /// See [`JwtConfig::from_env`] and [`SessionApiSettings::from_env`] for
    /// the rest.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let cookie_secure: bool = std::env::var("COOKIE_SECURE")
            .unwrap_or_else(|_| "false".into())
            .parse()
            .expect("COOKIE_SECURE must be true or false");

        let status_poll_interval_secs: u64 = std::env::var("STATUS_POLL_INTERVAL_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("STATUS_POLL_INTERVAL_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt: JwtConfig::from_env(),
            cookie_secure,
            status_poll_interval_secs,
            session_api: SessionApiSettings::from_env(),
        }
    }
}

// ---------------------------------------------------------------------------
// External session API
// ---------------------------------------------------------------------------

/// External API settings as given by the environment. Unset fields fall
/// back to the stored `api_config` row, then to the built-in default.
#[derive(Debug, Clone)]
pub struct SessionApiSettings {
    pub url: Option<String>,
    pub token: Option<String>,
    pub timeout_secs: u64,
}

/// Where the effective external API URL came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiConfigSource {
    Environment,
    Database,
    Default,
}

impl SessionApiSettings {
    /// | Env Var                     | Default |
    /// |-----------------------------|---------|
    /// | `WHAILEYS_API_URL`          | --      |
    /// | `WHAILEYS_API_TOKEN`        | --      |
    /// | `WHAILEYS_API_TIMEOUT_SECS` | `15`    |
    pub fn from_env() -> Self {
        let non_empty = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());

        let timeout_secs: u64 = std::env::var("WHAILEYS_API_TIMEOUT_SECS")
            .unwrap_or_else(|_| "15".into())
            .parse()
            .expect("WHAILEYS_API_TIMEOUT_SECS must be a valid u64");

        Self {
            url: non_empty("WHAILEYS_API_URL"),
            token: non_empty("WHAILEYS_API_TOKEN"),
            timeout_secs,
        }
    }

    /// Merge the environment with the stored row.
    ///
    /// The URL and token are resolved independently so an operator can keep
    /// the URL in the database and the token in the environment.
    pub fn resolve(&self, stored: Option<&ApiConfig>) -> (WhaileysConfig, ApiConfigSource) {
        let (base_url, source) = match (&self.url, stored) {
            (Some(url), _) => (url.clone(), ApiConfigSource::Environment),
            (None, Some(row)) => (row.api_url.clone(), ApiConfigSource::Database),
            (None, None) => (DEFAULT_API_URL.to_string(), ApiConfigSource::Default),
        };
        let token = self
            .token
            .clone()
            .or_else(|| stored.and_then(|row| row.api_token.clone()));

        let config = WhaileysConfig::new(base_url)
            .with_token(token)
            .with_timeout(Duration::from_secs(self.timeout_secs));
        (config, source)
    }
}
