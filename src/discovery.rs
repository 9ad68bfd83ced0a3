use std::sync::{Arc, RwLock};

use tokio::sync::Mutex;
use url::Url;

use crate::{oidc::OpenIdConfiguration, request, request::RequestError};

/// Process-wide cache for the provider's discovery document.
///
/// The document is fetched on first use and then kept forever; provider
/// endpoints do not move within the lifetime of a deployment. Call
/// [`DiscoveryCache::invalidate`] to force a re-fetch, e.g. from an
/// operational hook after a provider migration.
///
/// Concurrent cold starts are collapsed into a single upstream request: the
/// populate path is serialized through an async mutex with a second cache
/// check after acquisition, so every waiter is served from the one fetch
/// that actually went out.
#[derive(Debug)]
pub struct DiscoveryCache {
    client: reqwest::Client,
    discovery_endpoint: Url,
    current: RwLock<Option<Arc<OpenIdConfiguration>>>,
    fetch_lock: Mutex<()>,
}

impl DiscoveryCache {
    pub fn new(client: reqwest::Client, discovery_endpoint: Url) -> Self {
        Self {
            client,
            discovery_endpoint,
            current: RwLock::new(None),
            fetch_lock: Mutex::new(()),
        }
    }

    /// Returns the discovery document, fetching it if the cache is cold.
    ///
    /// A failed fetch leaves the cache empty, so the next caller triggers an
    /// independent attempt. There is no retry within a single call.
    pub async fn get(&self) -> Result<Arc<OpenIdConfiguration>, RequestError> {
        if let Some(config) = self.cached() {
            return Ok(config);
        }

        let _fetching = self.fetch_lock.lock().await;

        // Another task may have completed the fetch while we waited.
        if let Some(config) = self.cached() {
            return Ok(config);
        }

        tracing::debug!("Retrieving the OpenID configuration");
        let config = Arc::new(
            request::retrieve_openid_configuration(&self.client, self.discovery_endpoint.clone())
                .await?,
        );

        *self.current.write().expect("non-poisoned lock") = Some(Arc::clone(&config));

        Ok(config)
    }

    /// Drops the cached document. The next `get` fetches a fresh one.
    pub fn invalidate(&self) {
        *self.current.write().expect("non-poisoned lock") = None;
        tracing::debug!("Dropped the cached OpenID configuration");
    }

    fn cached(&self) -> Option<Arc<OpenIdConfiguration>> {
        self.current.read().expect("non-poisoned lock").clone()
    }
}
