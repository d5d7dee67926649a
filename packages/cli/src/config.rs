// ABOUTME: Server configuration read from the environment
// ABOUTME: Ports, database location, CORS, AI providers, webhook secret, and wizard tunables

use std::env;
use std::num::ParseIntError;
use std::path::PathBuf;
use std::time::Duration;

use juststart_api::ApiSettings;
use juststart_security::SubscriptionDefaults;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 4010;
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid port number: {0}")]
    InvalidPort(#[from] ParseIntError),
    #[error("Port {0} is out of valid range (1-65535)")]
    PortOutOfRange(u16),
    #[error("Invalid value for {name}: {value}")]
    InvalidNumber { name: &'static str, value: String },
    #[error("{name} must be greater than zero")]
    NotPositive { name: &'static str },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub host: String,
    pub database_path: PathBuf,
    pub cors_origin: String,
    pub anthropic_api_key: Option<String>,
    pub anthropic_model: Option<String>,
    pub perplexity_api_key: Option<String>,
    pub perplexity_model: Option<String>,
    pub webhook_secret: Option<String>,
    pub default_tier: String,
    pub default_credits: i64,
    pub share_link_ttl_days: i64,
    pub generation_lease_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match get("PORT") {
            Some(raw) => raw.parse::<u16>()?,
            None => DEFAULT_PORT,
        };
        if port == 0 {
            return Err(ConfigError::PortOutOfRange(port));
        }

        let default_credits = parse_number(get("DEFAULT_CREDITS"), "DEFAULT_CREDITS", 1)?;
        if default_credits < 0 {
            return Err(ConfigError::InvalidNumber {
                name: "DEFAULT_CREDITS",
                value: default_credits.to_string(),
            });
        }

        let share_link_ttl_days =
            parse_number(get("SHARE_LINK_TTL_DAYS"), "SHARE_LINK_TTL_DAYS", 7)?;
        if share_link_ttl_days <= 0 {
            return Err(ConfigError::NotPositive {
                name: "SHARE_LINK_TTL_DAYS",
            });
        }

        let generation_lease_secs =
            parse_number(get("GENERATION_LEASE_SECS"), "GENERATION_LEASE_SECS", 300)?;
        if generation_lease_secs == 0 {
            return Err(ConfigError::NotPositive {
                name: "GENERATION_LEASE_SECS",
            });
        }

        Ok(Config {
            port,
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            database_path: get("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(juststart_core::default_database_path),
            cors_origin: get("CORS_ORIGIN").unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string()),
            anthropic_api_key: get("ANTHROPIC_API_KEY"),
            anthropic_model: get("ANTHROPIC_MODEL"),
            perplexity_api_key: get("PERPLEXITY_API_KEY"),
            perplexity_model: get("PERPLEXITY_MODEL"),
            webhook_secret: get("IDENTITY_WEBHOOK_SECRET"),
            default_tier: get("DEFAULT_SUBSCRIPTION_TIER").unwrap_or_else(|| "free".to_string()),
            default_credits,
            share_link_ttl_days,
            generation_lease_secs,
        })
    }

    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            webhook_secret: self.webhook_secret.clone(),
            subscription_defaults: SubscriptionDefaults {
                tier: self.default_tier.clone(),
                credits: self.default_credits,
            },
            share_link_ttl: chrono::Duration::days(self.share_link_ttl_days),
            generation_lease_ttl: Duration::from_secs(self.generation_lease_secs),
        }
    }
}

fn parse_number<T: std::str::FromStr>(
    raw: Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
        None => Ok(default),
    }
}
