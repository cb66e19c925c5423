//! Server configuration loaded from environment variables.
//!
//! `.env` is read by [`crate::run`] before this module looks at the
//! environment. Parsing goes through an injectable lookup so tests never
//! touch the process environment.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use crate::db::DbConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} has an invalid value: {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error("TEXTONLY_PASSWORD must be set when TEXTONLY_ENV is production")]
    MissingPassword,
}

/// Static basic-auth credentials guarding the write endpoints.
#[derive(Clone, Default)]
pub struct AuthConfig {
    pub user: String,
    pub password: String,
    pub realm: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("user", &self.user)
            .field("password", &"***")
            .field("realm", &self.realm)
            .finish()
    }
}

/// Public facing site details used by the pages and the feed.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub url: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: String,
    pub bind_addr: SocketAddr,
    pub db: DbConfig,
    pub auth: AuthConfig,
    pub site: SiteConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = var("TEXTONLY_ENV").unwrap_or_else(|| "development".to_string());

        let bind = var("TEXTONLY_URL").unwrap_or_else(|| "0.0.0.0:8080".to_string());
        let bind_addr = parse_bind_addr(&bind).ok_or(ConfigError::Invalid {
            key: "TEXTONLY_URL",
            value: bind,
        })?;

        let defaults = DbConfig::default();
        let db = DbConfig {
            url: var("TEXTONLY_DSN")
                .or_else(|| var("DATABASE_URL"))
                .unwrap_or(defaults.url),
            max_connections: parse_or(&var, "DB_POOL_MAX", defaults.max_connections)?,
            min_connections: parse_or(&var, "DB_POOL_MIN", defaults.min_connections)?,
            connect_timeout_secs: parse_or(&var, "DB_CONNECT_TIMEOUT", defaults.connect_timeout_secs)?,
            idle_timeout_secs: parse_or(&var, "DB_IDLE_TIMEOUT", defaults.idle_timeout_secs)?,
            query_timeout: Duration::from_secs(parse_or(
                &var,
                "TEXTONLY_DB_TIMEOUT",
                defaults.query_timeout.as_secs(),
            )?),
        };

        let auth = AuthConfig {
            user: var("TEXTONLY_USER").unwrap_or_else(|| "admin".to_string()),
            password: var("TEXTONLY_PASSWORD").unwrap_or_default(),
            realm: var("TEXTONLY_REALM").unwrap_or_else(|| "textonly".to_string()),
        };

        let site_url = var("TEXTONLY_SITE_URL").unwrap_or_else(|| format!("http://{bind_addr}"));
        let site = SiteConfig {
            url: site_url.trim_end_matches('/').to_string(),
            title: var("TEXTONLY_SITE_TITLE").unwrap_or_else(|| "textonly".to_string()),
            description: var("TEXTONLY_SITE_DESCRIPTION")
                .unwrap_or_else(|| "Latest posts".to_string()),
        };

        let config = Self {
            environment,
            bind_addr,
            db,
            auth,
            site,
        };

        if config.is_production() && config.auth.password.is_empty() {
            return Err(ConfigError::MissingPassword);
        }

        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Accepts `host:port`, or `:port` meaning all interfaces.
fn parse_bind_addr(value: &str) -> Option<SocketAddr> {
    let value = value.trim();
    match value.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{port}").parse().ok(),
        None => value.parse().ok(),
    }
}

fn parse_or<T, F>(var: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}
