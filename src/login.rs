use std::borrow::Cow;

use itertools::Itertools;
use url::Url;

use crate::{code_verifier::CodeChallenge, config::AuthConfig, csrf_token::CsrfToken};

/// Builds the URL the browser is redirected to for interactive login at the
/// provider. `openid` is always requested, whatever scopes are configured.
pub(crate) fn create_login_url(
    config: &AuthConfig,
    authorization_endpoint: Url,
    state: &CsrfToken,
    code_challenge: &CodeChallenge,
) -> Url {
    let scope = match config.scope.len() {
        0 => Cow::Borrowed("openid"),
        _ => Cow::Owned(
            config
                .scope
                .iter()
                .map(|it| it.trim())
                .chain(["openid"])
                .join(" "),
        ),
    };

    let mut login_url = authorization_endpoint;
    login_url
        .query_pairs_mut()
        .append_pair("client_id", &config.client_id)
        .append_pair("response_type", "code")
        .append_pair("redirect_uri", config.redirect_uri().as_str())
        .append_pair("scope", &scope)
        .append_pair("state", state.as_str())
        .append_pair("code_challenge", code_challenge.code_challenge())
        .append_pair(
            "code_challenge_method",
            code_challenge.code_challenge_method().as_str(),
        )
        .append_pair("locale", "en");
    login_url
}
