use std::env;

use anyhow::{Context, Result, bail};
use dotenvy::dotenv;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    /// Unset means the in-memory record store.
    pub database_url: Option<String>,
    pub api_prefix: String,
    pub log_dir: String,

    /// Unset means the employee routes are open.
    pub access: Option<AccessConfig>,

    // Rate limiting
    pub rate_access_per_min: u32,
}

#[derive(Clone, Debug)]
pub struct AccessConfig {
    /// argon2 PHC string of the access passcode
    pub passcode_hash: String,
    pub jwt_secret: String,
    pub token_ttl: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        let server_addr = match var("SERVER_ADDR") {
            Some(addr) => addr,
            None => {
                let port: u16 = parse_or(var("PORT"), 5000, "PORT")?;
                format!("0.0.0.0:{}", port)
            }
        };

        let access = match var("ACCESS_PASSCODE_HASH") {
            Some(passcode_hash) => {
                let Some(jwt_secret) = var("JWT_SECRET") else {
                    bail!("JWT_SECRET must be set when ACCESS_PASSCODE_HASH is set");
                };
                Some(AccessConfig {
                    passcode_hash,
                    jwt_secret,
                    // default 8 hours
                    token_ttl: parse_or(var("ACCESS_TOKEN_TTL"), 28_800, "ACCESS_TOKEN_TTL")?,
                })
            }
            None => None,
        };

        Ok(Self {
            server_addr,
            database_url: var("DATABASE_URL"),
            api_prefix: var("API_PREFIX").unwrap_or_else(|| "/api".to_string()),
            log_dir: var("LOG_DIR").unwrap_or_else(|| "logs".to_string()),
            access,
            rate_access_per_min: parse_or(var("RATE_ACCESS_PER_MIN"), 30, "RATE_ACCESS_PER_MIN")?,
        })
    }
}

fn parse_or<T>(raw: Option<String>, default: T, key: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(v) => v
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", key, v)),
        None => Ok(default),
    }
}
