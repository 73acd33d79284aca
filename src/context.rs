use crate::aggregator::FanOutAggregator;
use crate::auth::AuthManager;
use crate::config::Config;
use std::sync::Arc;

/// Application context containing shared dependencies
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub auth_manager: Arc<AuthManager>,
    pub aggregator: Arc<FanOutAggregator>,
}

impl AppContext {
    pub fn new(
        config: Arc<Config>,
        auth_manager: Arc<AuthManager>,
        aggregator: Arc<FanOutAggregator>,
    ) -> Self {
        Self {
            config,
            auth_manager,
            aggregator,
        }
    }

    /// Build every shared component from configuration
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let auth_manager = AuthManager::new(&config)?;
        let aggregator = FanOutAggregator::from_config(&config.upstream)?;
        Ok(Self::new(
            Arc::new(config),
            Arc::new(auth_manager),
            Arc::new(aggregator),
        ))
    }

    /// Credential carried by a request: bearer header first, then cookie
    pub fn request_token(&self, headers: &axum::http::HeaderMap) -> Option<String> {
        crate::utils::extract_bearer(headers).or_else(|| {
            crate::utils::extract_cookie(headers, &self.config.security.cookie_name)
        })
    }
}
