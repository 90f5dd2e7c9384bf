use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::auth::token::DEFAULT_TOKEN_TTL_HOURS;
use crate::auth::MIN_BCRYPT_COST;
use crate::store::DEFAULT_STORE_TIMEOUT;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    /// `None` runs against the in-memory store.
    pub database_url: Option<String>,
    pub server_port: u16,
    pub server_host: String,
    pub token_ttl_hours: i64,
    pub store_timeout: Duration,
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. Unset and empty values are
    /// treated alike.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let token_ttl_hours: i64 = parse_or(&get, "TOKEN_TTL_HOURS", DEFAULT_TOKEN_TTL_HOURS)?;
        if token_ttl_hours <= 0 {
            return Err(invalid("TOKEN_TTL_HOURS", token_ttl_hours));
        }

        let store_timeout_secs: u64 =
            parse_or(&get, "STORE_TIMEOUT_SECS", DEFAULT_STORE_TIMEOUT.as_secs())?;
        if store_timeout_secs == 0 {
            return Err(invalid("STORE_TIMEOUT_SECS", store_timeout_secs));
        }

        let bcrypt_cost: u32 = parse_or(&get, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(MIN_BCRYPT_COST..=31).contains(&bcrypt_cost) {
            return Err(invalid("BCRYPT_COST", bcrypt_cost));
        }

        Ok(Self {
            jwt_secret,
            database_url: get("DATABASE_URL"),
            server_port: parse_or(&get, "SERVER_PORT", 8080)?,
            server_host: get("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            token_ttl_hours,
            store_timeout: Duration::from_secs(store_timeout_secs),
            bcrypt_cost,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.token_ttl_hours)
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}

fn invalid(key: &'static str, value: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
    }
}
