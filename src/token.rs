use serde::{Deserialize, Serialize};
use time::Duration;

use crate::response::SuccessTokenResponse;

/// Tokens received from a successful code exchange.
///
/// Tokens are opaque to this service. They are never persisted server side;
/// they only live in the browser cookies written from this struct. `Debug` is
/// redacted so a logged `TokenSet` cannot leak credentials.
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TokenSet {
    /// Bearer token for the customer API.
    pub access_token: String,

    /// Declared access token lifetime in seconds.
    pub expires_in: i64,

    /// Only present when the provider chose to issue one.
    pub refresh_token: Option<String>,

    pub token_type: Option<String>,

    pub id_token: Option<String>,

    pub scope: Option<String>,
}

impl TokenSet {
    /// How long the access token cookie may live: exactly the lifetime the
    /// provider declared for the token itself.
    pub fn access_token_max_age(&self) -> Duration {
        Duration::seconds(self.expires_in.max(0))
    }
}

impl From<SuccessTokenResponse> for TokenSet {
    fn from(value: SuccessTokenResponse) -> Self {
        Self {
            access_token: value.access_token,
            expires_in: value.expires_in,
            refresh_token: value.refresh_token,
            token_type: value.token_type,
            id_token: value.id_token,
            scope: value.scope,
        }
    }
}

impl std::fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSet")
            .field("access_token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("token_type", &self.token_type)
            .field("id_token", &self.id_token.as_ref().map(|_| "<redacted>"))
            .field("scope", &self.scope)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::TokenSet;
    use assertr::prelude::*;
    use time::Duration;

    fn token_set() -> TokenSet {
        TokenSet {
            access_token: "tok1".to_owned(),
            expires_in: 3600,
            refresh_token: Some("refresh1".to_owned()),
            token_type: Some("Bearer".to_owned()),
            id_token: None,
            scope: None,
        }
    }

    #[test]
    fn access_token_max_age_matches_declared_lifetime() {
        assert_that(token_set().access_token_max_age()).is_equal_to(Duration::seconds(3600));
    }

    #[test]
    fn negative_lifetimes_are_clamped_to_zero() {
        let mut tokens = token_set();
        tokens.expires_in = -5;
        assert_that(tokens.access_token_max_age()).is_equal_to(Duration::ZERO);
    }

    #[test]
    fn debug_output_is_redacted() {
        let debug = format!("{:?}", token_set());
        assert_that(debug.contains("tok1")).is_false();
        assert_that(debug.contains("refresh1")).is_false();
        assert_that(debug.contains("<redacted>")).is_true();
    }
}
