use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // username
    pub jti: String, // JWT ID (unique per token)
    pub exp: i64,    // Expiration time
    pub iat: i64,    // Issued at
    pub iss: String, // Issuer
}

/// A freshly signed credential
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub jti: String,
    /// Lifetime in seconds, as declared to the client
    pub expires_in: i64,
    /// Expiration timestamp (Unix epoch seconds)
    pub expires_at: i64,
}

/// Signs and verifies credentials with the shared HS256 key.
///
/// Read-only after construction; one instance is shared by every request.
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_ttl_secs: i64,
    issuer: String,
}

impl AuthManager {
    pub fn new(config: &Config) -> Result<Self> {
        Self::from_secret(
            &config.jwt_secret,
            &config.jwt_issuer,
            config.access_token_ttl_secs,
        )
    }

    pub fn from_secret(secret: &str, issuer: &str, access_token_ttl_secs: i64) -> Result<Self> {
        if secret.trim().is_empty() {
            anyhow::bail!("JWT secret must not be empty");
        }
        if access_token_ttl_secs <= 0 {
            anyhow::bail!("Access token TTL must be positive");
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_ttl_secs,
            issuer: issuer.to_string(),
        })
    }

    /// Token lifetime in seconds
    pub fn access_token_ttl_secs(&self) -> i64 {
        self.access_token_ttl_secs
    }

    /// Create access token for `username`
    pub fn create_token(&self, username: &str) -> Result<IssuedToken> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.access_token_ttl_secs);
        let jti = Uuid::new_v4().to_string();

        let claims = Claims {
            sub: username.to_string(),
            jti: jti.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.issuer.clone(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .context("Failed to encode JWT token")?;

        Ok(IssuedToken {
            token,
            jti,
            expires_in: self.access_token_ttl_secs,
            expires_at: exp.timestamp(),
        })
    }

    /// Verify signature, issuer and expiry
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.issuer.clone()]);
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .context("Token verification failed")?;
        Ok(token_data.claims)
    }

    /// Fail-closed validity check: any verification error means "invalid"
    pub fn is_valid(&self, token: &str) -> bool {
        match self.verify_token(token) {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(error = %e, "Credential rejected");
                false
            }
        }
    }
}
