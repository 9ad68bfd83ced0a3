use axum::Json;
use axum::Router;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use snafu::{OptionExt, ResultExt, ensure};
use url::Url;

use crate::code_verifier::CodeVerifier;
use crate::csrf_token::CsrfToken;
use crate::customer_api::Customer;
use crate::error::{
    AuthError, CustomerApiSnafu, DiscoverySnafu, MissingAttemptSnafu, MissingCodeSnafu,
    StateMismatchSnafu, TokenExchangeSnafu,
};
use crate::login::create_login_url;
use crate::request;
use crate::session::LoginAttempt;
use crate::state::AppState;
use crate::token::TokenSet;

/// The complete route surface of the customer auth service.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/account/login", get(login))
        .route("/account/callback", get(callback))
        .route("/account/logout", get(logout))
        .route("/account/me", get(me))
        .route("/healthz", get(health))
        .with_state(state)
}

/// A `302 Found` redirect. `axum::response::Redirect` answers 303 on these
/// routes, which is not what browser and storefront tooling expect from the
/// classic login flow.
struct Found(Url);

impl IntoResponse for Found {
    fn into_response(self) -> Response {
        (
            StatusCode::FOUND,
            [(header::LOCATION, self.0.as_str().to_owned())],
        )
            .into_response()
    }
}

/// Starts a login attempt: generates the PKCE material and a state token,
/// stores both in short-lived cookies and redirects the browser to the
/// provider's authorization endpoint.
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Found), AuthError> {
    let openid_configuration = state.discovery.get().await.context(DiscoverySnafu {})?;

    let verifier = CodeVerifier::generate();
    let csrf_token = CsrfToken::new();
    let code_challenge = verifier.to_code_challenge();

    let login_url = create_login_url(
        &state.config,
        openid_configuration.authorization_endpoint.clone(),
        &csrf_token,
        &code_challenge,
    );

    let jar = state.cookies.store_attempt(jar, &verifier, &csrf_token);

    tracing::debug!("Redirecting to the authorization endpoint");
    Ok((jar, Found(login_url)))
}

#[derive(Debug, Deserialize)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
}

/// Completes a login attempt: validates the returned state against the
/// attempt cookie, exchanges the authorization code for tokens and writes the
/// session cookies. On failure the response carries no session cookies, only
/// the cleared attempt cookies.
async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
    jar: CookieJar,
) -> Result<(CookieJar, Found), (CookieJar, AuthError)> {
    let attempt = state.cookies.read_attempt(&jar);
    // The attempt cookies are single-use. Whatever happens next, they are gone.
    let jar = state.cookies.clear_attempt(jar);

    match complete_login(&state, attempt, params).await {
        Ok(tokens) => {
            let jar = state.cookies.store_tokens(jar, &tokens);
            tracing::info!("Login completed");
            Ok((jar, Found(state.config.post_login_redirect())))
        }
        Err(err) => Err((jar, err)),
    }
}

async fn complete_login(
    state: &AppState,
    attempt: Option<LoginAttempt>,
    params: CallbackParams,
) -> Result<TokenSet, AuthError> {
    let attempt = attempt.context(MissingAttemptSnafu)?;

    // Every attempt gets a fresh state token, so a plain equality check is
    // enough; there is no long-lived secret to probe here.
    ensure!(
        params.state.as_deref() == Some(attempt.state.as_str()),
        StateMismatchSnafu
    );

    let code = params.code.context(MissingCodeSnafu)?;

    let openid_configuration = state.discovery.get().await.context(DiscoverySnafu {})?;

    request::exchange_code_for_token(
        &state.http,
        openid_configuration.token_endpoint.clone(),
        &state.config.client_id,
        state.config.redirect_uri().as_str(),
        &code,
        attempt.verifier.code_verifier(),
    )
    .await
    .context(TokenExchangeSnafu {})
}

/// Ends the session on this browser. The tokens are dropped client-side
/// only; the provider session stays untouched.
async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Found) {
    let jar = state.cookies.clear_tokens(jar);
    tracing::debug!("Session cookies cleared");
    (jar, Found(state.config.post_logout_redirect()))
}

#[derive(Debug, Serialize)]
struct MeResponse {
    authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    customer: Option<Customer>,
}

/// Reports who is logged in, if anyone. Without an access token cookie this
/// answers immediately and makes no outbound request at all.
async fn me(State(state): State<AppState>, jar: CookieJar) -> Result<Json<MeResponse>, AuthError> {
    let Some(access_token) = state.cookies.read_access_token(&jar) else {
        return Ok(Json(MeResponse {
            authenticated: false,
            customer: None,
        }));
    };

    let customer = state
        .customer_api
        .current_customer(&access_token)
        .await
        .context(CustomerApiSnafu {})?;

    Ok(Json(MeResponse {
        authenticated: true,
        customer: Some(customer),
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
