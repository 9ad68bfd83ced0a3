use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use url::Url;

/// The parts of the provider's OpenID Connect discovery document that drive the
/// login flow. Everything else the provider advertises is kept in `additional`
/// so the document round-trips without loss.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OpenIdConfiguration {
    pub issuer: Option<String>,

    /// Where the browser is sent for interactive login.
    pub authorization_endpoint: Url,

    /// Where the authorization code is exchanged for tokens.
    pub token_endpoint: Url,

    #[serde(flatten)]
    pub additional: HashMap<String, serde_json::Value>,
}
