use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use snafu::Snafu;

use crate::{config::ConfigError, customer_api::GraphQlError, request::RequestError};

/// Failures while building the shared application state.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SetupError {
    #[snafu(display("SetupError: Invalid configuration"))]
    Config { source: ConfigError },

    #[snafu(display("SetupError: Could not construct the HTTP client"))]
    HttpClient { source: reqwest::Error },
}

/// An enumeration representing various authentication-related errors.
///
/// Everything the login flow can reject or fail on ends up here, with a
/// stable machine-readable kind and an HTTP status. Messages never contain
/// token or verifier values.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum AuthError {
    /// The provider's discovery document could not be retrieved. Fatal for
    /// every login attempt in flight.
    #[snafu(display("AuthError: Could not retrieve the OpenID configuration"))]
    Discovery { source: RequestError },

    /// Callback arrived without the attempt cookies. Either the attempt
    /// expired or the callback was not preceded by a login on this browser.
    #[snafu(display("AuthError: Login callback without a pending login attempt"))]
    MissingAttempt,

    /// Callback state does not match the one stored for the attempt.
    #[snafu(display("AuthError: Login callback carried an unexpected state token"))]
    StateMismatch,

    #[snafu(display("AuthError: Login callback carried no authorization code"))]
    MissingCode,

    /// The provider rejected the code exchange. Not retryable; the user has
    /// to start a fresh login.
    #[snafu(display("AuthError: Could not exchange the authorization code"))]
    TokenExchange { source: RequestError },

    #[snafu(display("AuthError: Customer API query failed"))]
    CustomerApi { source: GraphQlError },
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Discovery { .. } => StatusCode::BAD_GATEWAY,
            AuthError::MissingAttempt
            | AuthError::StateMismatch
            | AuthError::MissingCode
            | AuthError::TokenExchange { .. } => StatusCode::BAD_REQUEST,
            AuthError::CustomerApi { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    /// Stable machine-readable error kind for response bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::Discovery { .. } => "discovery_unavailable",
            AuthError::MissingAttempt | AuthError::StateMismatch | AuthError::MissingCode => {
                "invalid_login_state"
            }
            AuthError::TokenExchange { .. } => "token_exchange_failed",
            AuthError::CustomerApi { .. } => "customer_api_unavailable",
        }
    }

    fn public_message(&self) -> String {
        match self {
            AuthError::MissingAttempt | AuthError::StateMismatch | AuthError::MissingCode => {
                "Invalid login state. Please try again.".to_owned()
            }
            AuthError::TokenExchange {
                source: RequestError::ErrResponse { error_response },
            } => error_response.message(),
            AuthError::TokenExchange { .. } => "Token exchange failed".to_owned(),
            AuthError::Discovery { .. } => {
                "The identity provider is currently unavailable".to_owned()
            }
            AuthError::CustomerApi { .. } => {
                "The customer API is currently unavailable".to_owned()
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(err = ?self, status = status.as_u16(), "Request failed");
        } else {
            tracing::warn!(err = ?self, status = status.as_u16(), "Request rejected");
        }

        let body = Json(serde_json::json!({
            "error": self.kind(),
            "message": self.public_message(),
        }));

        (status, body).into_response()
    }
}
