use anyhow::{Context, Result};

mod security;
mod upstream;

pub use security::SecurityConfig;
pub use upstream::UpstreamConfig;

// ============================================================================
// Configuration Constants
// ============================================================================

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
const DEFAULT_JWT_ISSUER: &str = "summary-gateway";

// Tokens live for 8 hours, matching the login cookie lifetime
const DEFAULT_ACCESS_TOKEN_TTL_SECS: i64 = 8 * SECONDS_PER_HOUR;

pub const SECONDS_PER_HOUR: i64 = 3600;

/// Minimum HS256 secret length in bytes
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Request bodies above this size are rejected (large articles are fine, uploads are not)
pub const MAX_REQUEST_BODY_SIZE: usize = 2 * 1024 * 1024;

// ============================================================================
// Configuration Structures
// ============================================================================

/// Main configuration for the gateway
#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub bind_address: String,

    /// Shared HS256 key used both to sign and to verify credentials
    pub jwt_secret: String,
    pub jwt_issuer: String,
    /// Credential lifetime in seconds (also the cookie Max-Age)
    pub access_token_ttl_secs: i64,

    /// Single account accepted by the login endpoint
    pub auth_username: String,
    pub auth_password: String,

    // Sub-configurations
    pub security: SecurityConfig,
    pub upstream: UpstreamConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            anyhow::bail!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LEN
            );
        }

        let auth_username =
            std::env::var("BASIC_AUTH_USER").context("BASIC_AUTH_USER must be set")?;
        let auth_password =
            std::env::var("BASIC_AUTH_PASS").context("BASIC_AUTH_PASS must be set")?;
        if auth_username.is_empty() || auth_password.is_empty() {
            anyhow::bail!("BASIC_AUTH_USER and BASIC_AUTH_PASS must not be empty");
        }

        Ok(Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            bind_address: std::env::var("BIND_ADDRESS")
                .unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.to_string()),
            jwt_secret,
            jwt_issuer: std::env::var("JWT_ISSUER")
                .unwrap_or_else(|_| DEFAULT_JWT_ISSUER.to_string()),
            access_token_ttl_secs: std::env::var("ACCESS_TOKEN_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|ttl: &i64| *ttl > 0)
                .unwrap_or(DEFAULT_ACCESS_TOKEN_TTL_SECS),
            auth_username,
            auth_password,
            security: SecurityConfig::from_env(),
            upstream: UpstreamConfig::from_env()?,
        })
    }

    /// Socket address string the server binds to
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}
