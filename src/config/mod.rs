//! Configuration module for feedkeeper.
//!
//! Loads configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::cache::keys::DEFAULT_NAMESPACE;
use crate::error::ConfigError;
use crate::expiry::{ExpiryPolicy, Retention};

const DEFAULT_BACKUP_DAYS: u32 = 7;
const DEFAULT_ARTICLE_DAYS: u32 = 14;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    // MongoDB
    pub mongodb_uri: String,
    /// Database name. Its length counts against partition name limits.
    pub mongodb_database: String,

    /// Honour the configured article retention. When off, articles use the
    /// default retention regardless of `articles_expire`.
    pub database_clean: bool,
    pub articles_expire: Retention,
    pub guild_backups_expire: Retention,

    /// Prefix for every cache key.
    pub cache_namespace: String,
    /// Lifetime of cached membership checks.
    pub cache_ttl: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    /// Returns an error if `MONGODB_URI` is unset or a value is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mongodb_uri = lookup("MONGODB_URI")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("MONGODB_URI"))?;

        let database_clean = match lookup("DATABASE_CLEAN") {
            Some(raw) => parse_bool("DATABASE_CLEAN", &raw)?,
            None => false,
        };

        let configured_articles = lookup("ARTICLES_EXPIRE").and_then(|raw| Retention::parse(&raw));
        let articles_expire = match configured_articles {
            Some(retention) if database_clean => retention,
            _ => Retention::Days(DEFAULT_ARTICLE_DAYS),
        };

        let guild_backups_expire = lookup("GUILD_BACKUPS_EXPIRE")
            .and_then(|raw| Retention::parse(&raw))
            .unwrap_or(Retention::Days(DEFAULT_BACKUP_DAYS));

        let cache_ttl = match lookup("CACHE_TTL_SECS") {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
                    name: "CACHE_TTL_SECS",
                    value: raw.clone(),
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(300),
        };

        Ok(Self {
            mongodb_uri,
            mongodb_database: lookup("MONGODB_DATABASE")
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "feedkeeper".to_string()),
            database_clean,
            articles_expire,
            guild_backups_expire,
            cache_namespace: lookup("CACHE_NAMESPACE")
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
            cache_ttl,
        })
    }

    /// Retention settings as an expiry policy.
    pub fn expiry_policy(&self) -> ExpiryPolicy {
        ExpiryPolicy::new(self.guild_backups_expire, self.articles_expire)
    }
}

fn parse_bool(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value: raw.to_string(),
        }),
    }
}
