use argon2::Params;
use chrono::{TimeDelta, Utc};
use secrecy::SecretString;
use std::str::FromStr;
use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES: i64 = 30;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has an invalid value: {value}")]
    Invalid { var: &'static str, value: String },

    #[error("invalid password hash cost: {0}")]
    InvalidHashCost(String),
}

/// Process configuration, read once at startup from the environment
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub jwt_secret: SecretString,
    pub access_token_expiration: TimeDelta,
    pub password_hash_params: Params,
    pub database_url: Option<SecretString>,
    pub bind_addr: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests don't have to touch
    /// the process environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.trim().is_empty())
            .map(SecretString::from)
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let access_token_expire_minutes = parse_or(
            &lookup,
            "ACCESS_TOKEN_EXPIRE_MINUTES",
            DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES,
        )?;
        let access_token_expiration = token_expiration(access_token_expire_minutes)?;

        let password_hash_params = Params::new(
            parse_or(
                &lookup,
                "PASSWORD_HASH_MEMORY_KIB",
                Params::DEFAULT_M_COST,
            )?,
            parse_or(&lookup, "PASSWORD_HASH_ITERATIONS", Params::DEFAULT_T_COST)?,
            parse_or(&lookup, "PASSWORD_HASH_PARALLELISM", Params::DEFAULT_P_COST)?,
            None,
        )
        .map_err(|e| ConfigError::InvalidHashCost(e.to_string()))?;

        Ok(Self {
            jwt_secret,
            access_token_expiration,
            password_hash_params,
            database_url: lookup("DATABASE_URL")
                .filter(|s| !s.is_empty())
                .map(SecretString::from),
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        })
    }
}

/// Token lifetime must be positive and leave `now + lifetime` representable
fn token_expiration(minutes: i64) -> Result<TimeDelta, ConfigError> {
    let invalid = || ConfigError::Invalid {
        var: "ACCESS_TOKEN_EXPIRE_MINUTES",
        value: minutes.to_string(),
    };

    if minutes <= 0 {
        return Err(invalid());
    }
    let expiration = TimeDelta::try_minutes(minutes).ok_or_else(invalid)?;
    Utc::now()
        .checked_add_signed(expiration)
        .ok_or_else(invalid)?;
    Ok(expiration)
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
        None => Ok(default),
    }
}
