use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::{code_verifier::CodeVerifier, csrf_token::CsrfToken, token::TokenSet};

/// Holds the PKCE verifier of the login attempt currently in flight.
pub const PKCE_VERIFIER_COOKIE: &str = "pkce_verifier";
/// Holds the state token of the login attempt currently in flight.
pub const OAUTH_STATE_COOKIE: &str = "oauth_state";
/// Holds the bearer token for the customer API.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
/// Holds the refresh token, when the provider issued one.
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// A login attempt not completed within this window is abandoned.
const LOGIN_ATTEMPT_TTL: Duration = Duration::minutes(10);
const REFRESH_TOKEN_TTL: Duration = Duration::days(30);

/// Reads and writes the session as browser cookies.
///
/// There is no server-side session table. Everything a request needs, the
/// in-flight login attempt as well as the established session, is carried in
/// `HttpOnly`, `SameSite=Lax` cookies scoped to the whole site. All writes go
/// through here so no handler can accidentally weaken an attribute.
#[derive(Debug, Clone)]
pub struct SessionCookies {
    secure: bool,
}

/// The two attempt cookies read back on callback.
pub(crate) struct LoginAttempt {
    pub verifier: CodeVerifier,
    pub state: String,
}

impl SessionCookies {
    /// `secure` controls the cookies' `Secure` attribute. Only pass `false`
    /// in development, where the app is served over plain http.
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    pub(crate) fn store_attempt(
        &self,
        jar: CookieJar,
        verifier: &CodeVerifier,
        state: &CsrfToken,
    ) -> CookieJar {
        jar.add(self.cookie(
            PKCE_VERIFIER_COOKIE,
            verifier.code_verifier().to_owned(),
            LOGIN_ATTEMPT_TTL,
        ))
        .add(self.cookie(
            OAUTH_STATE_COOKIE,
            state.as_str().to_owned(),
            LOGIN_ATTEMPT_TTL,
        ))
    }

    /// `None` unless both attempt cookies are present.
    pub(crate) fn read_attempt(&self, jar: &CookieJar) -> Option<LoginAttempt> {
        let verifier = jar.get(PKCE_VERIFIER_COOKIE)?.value().to_owned();
        let state = jar.get(OAUTH_STATE_COOKIE)?.value().to_owned();
        Some(LoginAttempt {
            verifier: CodeVerifier::from_stored(verifier),
            state,
        })
    }

    pub(crate) fn clear_attempt(&self, jar: CookieJar) -> CookieJar {
        jar.remove(removal(PKCE_VERIFIER_COOKIE))
            .remove(removal(OAUTH_STATE_COOKIE))
    }

    /// Writes the session cookies: the access token for exactly as long as
    /// the provider declared it valid, the refresh token (if any) for
    /// [`REFRESH_TOKEN_TTL`].
    pub(crate) fn store_tokens(&self, jar: CookieJar, tokens: &TokenSet) -> CookieJar {
        let jar = jar.add(self.cookie(
            ACCESS_TOKEN_COOKIE,
            tokens.access_token.clone(),
            tokens.access_token_max_age(),
        ));
        match &tokens.refresh_token {
            Some(refresh_token) => jar.add(self.cookie(
                REFRESH_TOKEN_COOKIE,
                refresh_token.clone(),
                REFRESH_TOKEN_TTL,
            )),
            None => jar,
        }
    }

    pub(crate) fn read_access_token(&self, jar: &CookieJar) -> Option<String> {
        jar.get(ACCESS_TOKEN_COOKIE)
            .map(|cookie| cookie.value().to_owned())
    }

    pub(crate) fn clear_tokens(&self, jar: CookieJar) -> CookieJar {
        jar.remove(removal(ACCESS_TOKEN_COOKIE))
            .remove(removal(REFRESH_TOKEN_COOKIE))
    }

    fn cookie(&self, name: &'static str, value: String, max_age: Duration) -> Cookie<'static> {
        let mut cookie = Cookie::new(name, value);
        cookie.set_http_only(true);
        cookie.set_secure(self.secure);
        cookie.set_same_site(SameSite::Lax);
        cookie.set_path("/");
        cookie.set_max_age(max_age);
        cookie
    }
}

// The removal cookie must carry the same path as the original, or the browser
// keeps the old cookie around.
fn removal(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, "");
    cookie.set_path("/");
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;
    use assertr::prelude::*;

    fn tokens(refresh: Option<&str>) -> TokenSet {
        TokenSet {
            access_token: "tok1".to_owned(),
            expires_in: 3600,
            refresh_token: refresh.map(str::to_owned),
            token_type: Some("Bearer".to_owned()),
            id_token: None,
            scope: None,
        }
    }

    #[test]
    fn attempt_cookies_carry_the_full_attribute_policy() {
        let cookies = SessionCookies::new(true);
        let jar = cookies.store_attempt(CookieJar::new(), &CodeVerifier::generate(), &CsrfToken::new());

        for name in [PKCE_VERIFIER_COOKIE, OAUTH_STATE_COOKIE] {
            let cookie = jar.get(name).unwrap();
            assert_that(cookie.http_only()).is_equal_to(Some(true));
            assert_that(cookie.secure()).is_equal_to(Some(true));
            assert_that(cookie.same_site()).is_equal_to(Some(SameSite::Lax));
            assert_that(cookie.path()).is_equal_to(Some("/"));
            assert_that(cookie.max_age()).is_equal_to(Some(Duration::minutes(10)));
        }
    }

    #[test]
    fn development_mode_drops_the_secure_attribute() {
        let cookies = SessionCookies::new(false);
        let jar = cookies.store_attempt(CookieJar::new(), &CodeVerifier::generate(), &CsrfToken::new());

        let cookie = jar.get(PKCE_VERIFIER_COOKIE).unwrap();
        assert_that(cookie.secure()).is_equal_to(Some(false));
    }

    #[test]
    fn attempt_round_trips_through_the_jar() {
        let cookies = SessionCookies::new(true);
        let verifier = CodeVerifier::generate();
        let state = CsrfToken::new();

        let jar = cookies.store_attempt(CookieJar::new(), &verifier, &state);
        let attempt = cookies.read_attempt(&jar).unwrap();

        assert_that(attempt.verifier.code_verifier()).is_equal_to(verifier.code_verifier());
        assert_that(attempt.state.as_str()).is_equal_to(state.as_str());
    }

    #[test]
    fn partial_attempt_reads_as_absent() {
        let cookies = SessionCookies::new(true);

        assert_that(cookies.read_attempt(&CookieJar::new()).is_none()).is_true();

        let jar = CookieJar::new().add(Cookie::new(PKCE_VERIFIER_COOKIE, "only-the-verifier"));
        assert_that(cookies.read_attempt(&jar).is_none()).is_true();
    }

    #[test]
    fn cleared_attempt_is_gone() {
        let cookies = SessionCookies::new(true);
        let jar = cookies.store_attempt(CookieJar::new(), &CodeVerifier::generate(), &CsrfToken::new());

        let jar = cookies.clear_attempt(jar);

        assert_that(jar.get(PKCE_VERIFIER_COOKIE).is_none()).is_true();
        assert_that(jar.get(OAUTH_STATE_COOKIE).is_none()).is_true();
    }

    #[test]
    fn access_token_cookie_lives_as_long_as_the_token() {
        let cookies = SessionCookies::new(true);
        let jar = cookies.store_tokens(CookieJar::new(), &tokens(Some("refresh1")));

        let access = jar.get(ACCESS_TOKEN_COOKIE).unwrap();
        assert_that(access.value()).is_equal_to("tok1");
        assert_that(access.max_age()).is_equal_to(Some(Duration::seconds(3600)));

        let refresh = jar.get(REFRESH_TOKEN_COOKIE).unwrap();
        assert_that(refresh.value()).is_equal_to("refresh1");
        assert_that(refresh.max_age()).is_equal_to(Some(Duration::days(30)));
    }

    #[test]
    fn missing_refresh_token_writes_no_refresh_cookie() {
        let cookies = SessionCookies::new(true);
        let jar = cookies.store_tokens(CookieJar::new(), &tokens(None));

        assert_that(jar.get(ACCESS_TOKEN_COOKIE).is_some()).is_true();
        assert_that(jar.get(REFRESH_TOKEN_COOKIE).is_none()).is_true();
    }

    #[test]
    fn cleared_tokens_are_gone() {
        let cookies = SessionCookies::new(true);
        let jar = cookies.store_tokens(CookieJar::new(), &tokens(Some("refresh1")));

        let jar = cookies.clear_tokens(jar);

        assert_that(cookies.read_access_token(&jar).is_none()).is_true();
        assert_that(jar.get(REFRESH_TOKEN_COOKIE).is_none()).is_true();
    }
}
