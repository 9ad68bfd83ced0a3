use std::sync::Arc;
use std::time::Duration;

use snafu::ResultExt;

use crate::config::AuthConfig;
use crate::customer_api::CustomerApiClient;
use crate::discovery::DiscoveryCache;
use crate::error::{ConfigSnafu, HttpClientSnafu, SetupError};
use crate::session::SessionCookies;

/// Upper bound for any single request against the provider or the customer
/// API. A hanging upstream must not keep a handler open indefinitely.
const OUTBOUND_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared state behind all route handlers.
///
/// Everything in here is cheap to clone. The single [`reqwest::Client`] is
/// reused for discovery, token exchange and customer API calls, so all
/// outbound traffic shares one connection pool and one timeout policy.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<AuthConfig>,
    pub http: reqwest::Client,
    pub discovery: Arc<DiscoveryCache>,
    pub customer_api: CustomerApiClient,
    pub cookies: SessionCookies,
}

impl AppState {
    /// Validates the configuration and wires up the HTTP client, the
    /// discovery cache and the customer API client around it.
    pub fn new(config: AuthConfig) -> Result<Self, SetupError> {
        config.validate().context(ConfigSnafu {})?;

        let http = reqwest::Client::builder()
            .timeout(OUTBOUND_REQUEST_TIMEOUT)
            .build()
            .context(HttpClientSnafu {})?;

        let discovery = Arc::new(DiscoveryCache::new(
            http.clone(),
            config.discovery_endpoint(),
        ));
        let customer_api = CustomerApiClient::new(http.clone(), config.customer_api_endpoint());
        let cookies = SessionCookies::new(config.cookie_secure);

        Ok(Self {
            config: Arc::new(config),
            http,
            discovery,
            customer_api,
            cookies,
        })
    }
}
