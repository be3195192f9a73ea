//! Configuration module for the tea farm backend and client.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Signing secret used when `TEAFARM_JWT_SECRET` is unset. Development only.
pub const DEV_JWT_SECRET: &str = "teafarm-dev-secret-change-me";

/// A configuration value that could not be parsed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {name} value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// HMAC secret for signing bearer tokens; `None` falls back to [`DEV_JWT_SECRET`]
    pub jwt_secret: Option<String>,
    /// Bearer token lifetime in seconds
    pub token_ttl_secs: u64,
    /// Password of the built-in `admin` account
    pub admin_password: String,
    /// Password of the built-in `user` account
    pub worker_password: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let db_path = env::var("TEAFARM_DB_PATH")
            .unwrap_or_else(|_| "./data/teafarm.sqlite".to_string())
            .into();

        let bind_addr_raw =
            env::var("TEAFARM_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let bind_addr = bind_addr_raw
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                name: "TEAFARM_BIND_ADDR",
                value: bind_addr_raw.clone(),
                reason: e.to_string(),
            })?;

        let log_level = env::var("TEAFARM_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let jwt_secret = env::var("TEAFARM_JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty());

        let token_ttl_secs = match env::var("TEAFARM_TOKEN_TTL_SECS") {
            Ok(raw) => raw
                .parse()
                .map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
                    name: "TEAFARM_TOKEN_TTL_SECS",
                    value: raw.clone(),
                    reason: e.to_string(),
                })?,
            Err(_) => 86_400,
        };

        let admin_password =
            env::var("TEAFARM_ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string());
        let worker_password =
            env::var("TEAFARM_WORKER_PASSWORD").unwrap_or_else(|_| "user123".to_string());

        Ok(Self {
            db_path,
            bind_addr,
            log_level,
            jwt_secret,
            token_ttl_secs,
            admin_password,
            worker_password,
        })
    }

    /// The secret tokens are signed with.
    pub fn signing_secret(&self) -> &str {
        self.jwt_secret.as_deref().unwrap_or(DEV_JWT_SECRET)
    }
}

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST API, including the `/api` prefix
    pub api_url: String,
    /// File holding the persisted bearer token and user
    pub credentials_path: PathBuf,
}

impl ClientConfig {
    /// Load client configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let api_url = env::var("TEAFARM_API_URL")
            .unwrap_or_else(|_| "http://localhost:8080/api".to_string());

        let credentials_path = env::var("TEAFARM_CREDENTIALS_PATH")
            .unwrap_or_else(|_| "./data/credentials.json".to_string())
            .into();

        Self {
            api_url,
            credentials_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Environment variables are process-wide, so every assertion that touches them
    // lives in this one test.
    #[test]
    fn test_config_from_env() {
        for name in [
            "TEAFARM_DB_PATH",
            "TEAFARM_BIND_ADDR",
            "TEAFARM_LOG_LEVEL",
            "TEAFARM_JWT_SECRET",
            "TEAFARM_TOKEN_TTL_SECS",
            "TEAFARM_ADMIN_PASSWORD",
            "TEAFARM_WORKER_PASSWORD",
            "TEAFARM_API_URL",
            "TEAFARM_CREDENTIALS_PATH",
        ] {
            env::remove_var(name);
        }

        let config = Config::from_env().unwrap();
        assert_eq!(config.db_path, PathBuf::from("./data/teafarm.sqlite"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
        assert!(config.jwt_secret.is_none());
        assert_eq!(config.signing_secret(), DEV_JWT_SECRET);
        assert_eq!(config.token_ttl_secs, 86_400);
        assert_eq!(config.admin_password, "admin123");
        assert_eq!(config.worker_password, "user123");

        let client = ClientConfig::from_env();
        assert_eq!(client.api_url, "http://localhost:8080/api");
        assert_eq!(
            client.credentials_path,
            PathBuf::from("./data/credentials.json")
        );

        env::set_var("TEAFARM_TOKEN_TTL_SECS", "soon");
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("TEAFARM_TOKEN_TTL_SECS"));
        env::remove_var("TEAFARM_TOKEN_TTL_SECS");

        env::set_var("TEAFARM_BIND_ADDR", "not-an-address");
        assert!(Config::from_env().is_err());
        env::remove_var("TEAFARM_BIND_ADDR");
    }
}
