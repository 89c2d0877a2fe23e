use std::env::VarError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Development,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub pool_size: u32,
    pub env: Environment,
}

impl AppConfig {
    /// Loads `.env` (when present) and reads the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `DATABASE_URL` is missing or a value does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key))
    }

    /// Builds the configuration from an arbitrary variable lookup, so tests
    /// can feed a map instead of mutating the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        let or_default = |var: &str, default: &str| -> String {
            lookup(var).unwrap_or_else(|_| default.to_string())
        };

        let database_url = lookup("DATABASE_URL")
            .map_err(|_| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?;
        let host = or_default("HOST", "0.0.0.0");
        let port = parse("PORT", &or_default("PORT", "8080"))?;
        let pool_size: u32 = parse("DATABASE_POOL_SIZE", &or_default("DATABASE_POOL_SIZE", "10"))?;
        if pool_size == 0 {
            return Err(ConfigError::InvalidEnvVar {
                var: "DATABASE_POOL_SIZE".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        let env = parse_environment(&or_default("APP_ENV", "production"))?;

        Ok(AppConfig {
            database_url,
            host,
            port,
            pool_size,
            env,
        })
    }

    pub fn is_development(&self) -> bool {
        self.env == Environment::Development
    }
}

fn parse<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: e.to_string(),
    })
}

fn parse_environment(raw: &str) -> Result<Environment, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "production" | "prod" => Ok(Environment::Production),
        "development" | "dev" => Ok(Environment::Development),
        other => Err(ConfigError::InvalidEnvVar {
            var: "APP_ENV".to_string(),
            reason: format!("expected production or development, got {other:?}"),
        }),
    }
}
