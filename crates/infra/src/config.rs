//! Process configuration loaded from the environment.
//!
//! A `.env` file in the working directory is honoured for local development.

use std::fmt;
use std::net::{IpAddr, SocketAddr};

use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_BCRYPT_COST: u32 = 10;
const BCRYPT_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),

    #[error("environment variable {name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Runtime settings for the API process.
#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Signing secret for access tokens (`ACCESS_TOKEN`).
    pub access_token_secret: String,
    /// Selects the Postgres backend when present.
    pub database_url: Option<String>,
    pub bcrypt_cost: u32,
}

impl AppConfig {
    /// Load from the process environment (after reading `.env`, if any).
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let access_token_secret = var("ACCESS_TOKEN").ok_or(ConfigError::Missing("ACCESS_TOKEN"))?;

        let host = match var("HOST") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "HOST",
                reason: format!("'{raw}' is not an IP address"),
            })?,
            None => DEFAULT_HOST.parse().map_err(|_| ConfigError::Invalid {
                name: "HOST",
                reason: "default host is not an IP address".to_string(),
            })?,
        };

        let port = match var("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                reason: format!("'{raw}' is not a port number"),
            })?,
            None => DEFAULT_PORT,
        };

        let bcrypt_cost = match var("BCRYPT_COST") {
            Some(raw) => {
                let cost: u32 = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                    name: "BCRYPT_COST",
                    reason: format!("'{raw}' is not a number"),
                })?;
                if !BCRYPT_COST_RANGE.contains(&cost) {
                    return Err(ConfigError::Invalid {
                        name: "BCRYPT_COST",
                        reason: format!("{cost} is outside 4..=31"),
                    });
                }
                cost
            }
            None => DEFAULT_BCRYPT_COST,
        };

        Ok(Self {
            host,
            port,
            access_token_secret,
            database_url: var("DATABASE_URL"),
            bcrypt_cost,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("access_token_secret", &"<redacted>")
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}
