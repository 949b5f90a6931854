/// Configuration management for social-api
///
/// Loaded once from environment variables at startup and passed explicitly to
/// the components that need it.
use crypto_core::jwt::{DEFAULT_ACCESS_TOKEN_TTL_SECS, MAX_ACCESS_TOKEN_TTL_SECS};
use crypto_core::{secret_strength, SecretStrength};
use serde::{Deserialize, Serialize};

const DEVELOPMENT_JWT_SECRET: &str = "development-only-secret-change-me-before-deploying";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    pub host: String,
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL URL; the in-memory store is used when absent
    pub url: Option<String>,
    /// Max connections in pool
    pub max_connections: u32,
}

/// Token signing configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_ttl_secs: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("access_token_ttl_secs", &self.access_token_ttl_secs)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let app_env = lookup("APP_ENV").unwrap_or_else(|| "development".to_string());
        let production = app_env.eq_ignore_ascii_case("production");

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        if production && database_url.is_none() {
            return Err("DATABASE_URL must be set in production".to_string());
        }

        let secret = match lookup("JWT_SECRET_KEY") {
            Some(secret) if !secret.is_empty() => secret,
            _ if production => return Err("JWT_SECRET_KEY must be set in production".to_string()),
            _ => DEVELOPMENT_JWT_SECRET.to_string(),
        };
        if production && secret_strength(&secret) == SecretStrength::Weak {
            return Err("JWT_SECRET_KEY is too weak for production".to_string());
        }

        let access_token_ttl_secs =
            parse_or_default(&lookup, "JWT_ACCESS_TOKEN_TTL_SECS", DEFAULT_ACCESS_TOKEN_TTL_SECS)?;
        if access_token_ttl_secs <= 0 {
            return Err("JWT_ACCESS_TOKEN_TTL_SECS must be positive".to_string());
        }
        if access_token_ttl_secs > MAX_ACCESS_TOKEN_TTL_SECS {
            return Err(format!(
                "JWT_ACCESS_TOKEN_TTL_SECS must not exceed {} seconds",
                MAX_ACCESS_TOKEN_TTL_SECS
            ));
        }

        Ok(Config {
            app: AppConfig {
                env: app_env,
                host: lookup("SOCIAL_API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_or_default(&lookup, "SOCIAL_API_PORT", 8080)?,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: parse_or_default(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
            },
            jwt: JwtConfig {
                secret,
                access_token_ttl_secs,
            },
        })
    }

    pub fn is_production(&self) -> bool {
        self.app.env.eq_ignore_ascii_case("production")
    }
}

fn parse_or_default<F, T>(lookup: &F, key: &str, default: T) -> Result<T, String>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(val) => val
            .parse()
            .map_err(|e| format!("Failed to parse {}='{}': {}", key, val, e)),
        None => Ok(default),
    }
}
