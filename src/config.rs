use snafu::{Snafu, ensure};
use url::Url;

/// Base URL of the identity provider hosting login and the customer API.
pub const DEFAULT_PROVIDER_BASE_URL: &str = "https://shopify.com";

/// Parameters required to run the login flow for one shop.
///
/// Constructed once at startup (typically from the process environment) and
/// shared read-only afterwards. Nothing in the crate reads environment
/// variables on its own.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Numeric id of the shop, as found in the Shopify admin. Appears in the
    /// provider's discovery and customer API URLs.
    pub shop_id: String,

    /// Client id of the headless storefront's Customer Account API client.
    pub client_id: String,

    /// Public base URL of this application, e.g. `https://shop.example.com`.
    /// The callback and post-login redirects derive from it.
    pub app_url: Url,

    /// Base URL of the identity provider. [`DEFAULT_PROVIDER_BASE_URL`] in
    /// production; overridable so staging setups and tests can point
    /// elsewhere.
    pub provider_base_url: Url,

    /// Additional scopes to request besides `openid`.
    pub scope: Vec<String>,

    /// Whether session cookies carry the `Secure` attribute. Disable only in
    /// development, where the app is served over plain http.
    pub cookie_secure: bool,
}

#[derive(Debug, Snafu)]
pub enum ConfigError {
    #[snafu(display("ConfigError: shop_id must not be empty"))]
    MissingShopId,

    #[snafu(display("ConfigError: client_id must not be empty"))]
    MissingClientId,

    #[snafu(display("ConfigError: {url} cannot serve as a base url"))]
    CannotBeABase { url: Url },
}

impl AuthConfig {
    /// The scopes the Customer Account API needs for customer queries.
    pub fn default_scope() -> Vec<String> {
        vec!["email".to_owned(), "customer-account-api:full".to_owned()]
    }

    pub fn default_provider_base_url() -> Url {
        Url::parse(DEFAULT_PROVIDER_BASE_URL).expect("valid url")
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure!(!self.shop_id.trim().is_empty(), MissingShopIdSnafu);
        ensure!(!self.client_id.trim().is_empty(), MissingClientIdSnafu);
        ensure!(
            !self.app_url.cannot_be_a_base(),
            CannotBeABaseSnafu {
                url: self.app_url.clone()
            }
        );
        ensure!(
            !self.provider_base_url.cannot_be_a_base(),
            CannotBeABaseSnafu {
                url: self.provider_base_url.clone()
            }
        );
        Ok(())
    }

    /// `{provider}/authentication/{shop_id}/.well-known/openid-configuration`
    pub fn discovery_endpoint(&self) -> Url {
        let mut url = self.provider_base_url.clone();
        url.path_segments_mut()
            .expect("no cannot-be-a-base url")
            .pop_if_empty()
            .extend(&[
                "authentication",
                &self.shop_id,
                ".well-known",
                "openid-configuration",
            ]);
        url
    }

    /// `{provider}/{shop_id}/account/customer/api/{version}/graphql`
    pub fn customer_api_endpoint(&self) -> Url {
        let mut url = self.provider_base_url.clone();
        url.path_segments_mut()
            .expect("no cannot-be-a-base url")
            .pop_if_empty()
            .extend(&[
                self.shop_id.as_str(),
                "account",
                "customer",
                "api",
                crate::customer_api::API_VERSION,
                "graphql",
            ]);
        url
    }

    /// The pre-registered callback URL the provider redirects back to.
    pub fn redirect_uri(&self) -> Url {
        let mut url = self.app_url.clone();
        url.path_segments_mut()
            .expect("no cannot-be-a-base url")
            .pop_if_empty()
            .extend(&["account", "callback"]);
        url
    }

    /// Where the browser lands after a completed login.
    pub fn post_login_redirect(&self) -> Url {
        let mut url = self.app_url.clone();
        url.path_segments_mut()
            .expect("no cannot-be-a-base url")
            .pop_if_empty()
            .extend(&["account"]);
        url
    }

    /// Where the browser lands after logout: the application root.
    pub fn post_logout_redirect(&self) -> Url {
        self.app_url.clone()
    }
}
