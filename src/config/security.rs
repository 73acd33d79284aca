// ============================================================================
// Security Configuration
// ============================================================================

/// Cookie flags and CORS policy
#[derive(Clone, Debug)]
pub struct SecurityConfig {
    /// Name of the cookie carrying the credential
    pub cookie_name: String,
    /// Emit `Secure` on the credential cookie (disable only for plain-HTTP local development)
    pub cookie_secure: bool,
    /// Origins allowed to call the API with credentials (comma-separated `ALLOWED_ORIGINS`)
    /// Empty means no cross-origin access
    pub allowed_origins: Vec<String>,
}

impl SecurityConfig {
    pub(crate) fn from_env() -> Self {
        Self {
            cookie_name: std::env::var("TOKEN_COOKIE_NAME")
                .unwrap_or_else(|_| "token".to_string()),
            cookie_secure: std::env::var("COOKIE_SECURE")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
            allowed_origins: std::env::var("ALLOWED_ORIGINS")
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            cookie_name: "token".to_string(),
            cookie_secure: true,
            allowed_origins: Vec::new(),
        }
    }
}
