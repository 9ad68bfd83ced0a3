use serde::{Deserialize, Serialize};

/// An enumeration representing the response to token requests, including
/// success and error responses.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub(crate) enum TokenResponse {
    Success(SuccessTokenResponse),
    Error(ErrorResponse),
}

/// A structure representing a successful token response.
///
/// The Customer Account API keeps `refresh_token` and `id_token` optional, so
/// both are modelled as such instead of assuming they are always present.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub(crate) struct SuccessTokenResponse {
    pub access_token: String,
    pub expires_in: i64,
    pub refresh_token: Option<String>,
    pub token_type: Option<String>,
    pub id_token: Option<String>,
    pub scope: Option<String>,
}

/// See [RFC 6749 Section 5.2](https://datatracker.ietf.org/doc/html/rfc6749#section-5.2) for details.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub enum KnownOidcErrorCode {
    /// The request is missing a required parameter, includes an unsupported parameter value
    /// (other than grant type), repeats a parameter, includes multiple credentials,
    /// utilizes more than one mechanism for authenticating the client, or is otherwise malformed.
    #[serde(rename = "invalid_request")]
    InvalidRequest,

    /// Client authentication failed (e.g., unknown client, no client authentication included,
    /// or unsupported authentication method).
    #[serde(rename = "invalid_client")]
    InvalidClient,

    /// The provided authorization grant (e.g., authorization code, resource owner credentials) or
    /// refresh token is invalid, expired, revoked, does not match the redirection URI used in the
    /// authorization request, or was issued to another client.
    #[serde(rename = "invalid_grant")]
    InvalidGrant,

    /// The authenticated client is not authorized to use this authorization grant type.
    #[serde(rename = "unauthorized_client")]
    UnauthorizedClient,

    /// The authorization grant type is not supported by the authorization server.
    #[serde(rename = "unsupported_grant_type")]
    UnsupportedGrantType,

    /// The requested scope is invalid, unknown, malformed, or exceeds the scope granted by the
    /// resource owner.
    #[serde(rename = "invalid_scope")]
    InvalidScope,
}

impl KnownOidcErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            KnownOidcErrorCode::InvalidRequest => "invalid_request",
            KnownOidcErrorCode::InvalidClient => "invalid_client",
            KnownOidcErrorCode::InvalidGrant => "invalid_grant",
            KnownOidcErrorCode::UnauthorizedClient => "unauthorized_client",
            KnownOidcErrorCode::UnsupportedGrantType => "unsupported_grant_type",
            KnownOidcErrorCode::InvalidScope => "invalid_scope",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum OidcErrorCode {
    Known(KnownOidcErrorCode),
    Unknown(String),
}

impl OidcErrorCode {
    pub fn as_str(&self) -> &str {
        match self {
            OidcErrorCode::Known(code) => code.as_str(),
            OidcErrorCode::Unknown(code) => code.as_str(),
        }
    }
}

/// OAuth error response received from the identity provider during token
/// exchange. Errors follow the OAuth 2.0 error response format.
///
/// See [RFC 6749 Section 5.2](https://datatracker.ietf.org/doc/html/rfc6749#section-5.2) for details.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ErrorResponse {
    /// The error code (e.g., `invalid_client` or `invalid_grant`).
    pub error: OidcErrorCode,

    /// OPTIONAL. Human-readable ASCII text providing additional information, used to
    /// assist the client developer in understanding the error that occurred.
    pub error_description: Option<String>,

    /// OPTIONAL. A URI identifying a human-readable web page with information about the error.
    pub error_uri: Option<String>,
}

impl ErrorResponse {
    /// The best human-readable description available: the provider's
    /// `error_description` when present, the bare error code otherwise.
    pub fn message(&self) -> String {
        match self.error_description.as_deref() {
            Some(description) if !description.is_empty() => description.to_owned(),
            _ => self.error.as_str().to_owned(),
        }
    }
}
