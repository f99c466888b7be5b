use std::env;
use std::fmt;
use std::time::Duration;

const DEFAULT_ACCESS_TOKEN_TTL_SECS: u64 = 60 * 60 * 12; // 12 hours
const DEFAULT_REFRESH_TOKEN_TTL_SECS: u64 = 60 * 60 * 24 * 7; // 7 days
const DEFAULT_RATE_LIMIT_REQUESTS: usize = 50;
const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;

/// Error produced while reading configuration from the environment.
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
    Inconsistent(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid { key, value } => write!(f, "{} has invalid value {:?}", key, value),
            ConfigError::Inconsistent(msg) => write!(f, "invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

pub struct Config {
    pub database_url: Option<String>,
    pub server_port: u16,
    pub server_host: String,
    pub jwt_secret: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    pub rate_limit_requests: usize,
    pub rate_limit_window: Duration,
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = env::var("JWT_SECRET")
            .or_else(|_| env::var("SECRET_KEY"))
            .map_err(|_| ConfigError::Missing("JWT_SECRET"))?;

        let config = Self {
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            server_port: parse_var("SERVER_PORT", 8080)?,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            jwt_secret,
            access_token_ttl: Duration::from_secs(parse_var(
                "ACCESS_TOKEN_TTL_SECS",
                DEFAULT_ACCESS_TOKEN_TTL_SECS,
            )?),
            refresh_token_ttl: Duration::from_secs(parse_var(
                "REFRESH_TOKEN_TTL_SECS",
                DEFAULT_REFRESH_TOKEN_TTL_SECS,
            )?),
            rate_limit_requests: parse_var("RATE_LIMIT_REQUESTS", DEFAULT_RATE_LIMIT_REQUESTS)?,
            rate_limit_window: Duration::from_secs(parse_var(
                "RATE_LIMIT_WINDOW_SECS",
                DEFAULT_RATE_LIMIT_WINDOW_SECS,
            )?),
            bcrypt_cost: parse_var("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field constraints that a single variable cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::Missing("JWT_SECRET"));
        }
        if self.access_token_ttl.is_zero() || self.refresh_token_ttl.is_zero() {
            return Err(ConfigError::Inconsistent("token lifetimes must be positive".into()));
        }
        if self.access_token_ttl > self.refresh_token_ttl {
            return Err(ConfigError::Inconsistent(
                "access tokens must not outlive refresh tokens".into(),
            ));
        }
        if self.rate_limit_requests == 0 || self.rate_limit_window.is_zero() {
            return Err(ConfigError::Inconsistent(
                "rate limit requests and window must be positive".into(),
            ));
        }
        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST",
                value: self.bcrypt_cost.to_string(),
            });
        }
        Ok(())
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse_var<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        Err(_) => Ok(default),
    }
}
