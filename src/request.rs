use reqwest::StatusCode;
use snafu::{ResultExt, Snafu};
use url::Url;

use crate::{
    oidc::OpenIdConfiguration,
    response::{ErrorResponse, TokenResponse},
    token::TokenSet,
};

#[derive(Debug, Snafu)]
pub enum RequestError {
    #[snafu(display("RequestError: Could not send request"))]
    Send { source: reqwest::Error },

    #[snafu(display("RequestError: Could not decode payload"))]
    Decode { source: reqwest::Error },

    #[snafu(display("RequestError: Received unexpected status code {status}"))]
    Status { status: StatusCode },

    #[snafu(display("RequestError: Received an error response"))]
    ErrResponse { error_response: ErrorResponse },
}

/// Fetches the provider's discovery document. Any non-success status is an
/// error; there is no meaningful fallback when the provider cannot describe
/// its endpoints.
pub(crate) async fn retrieve_openid_configuration(
    client: &reqwest::Client,
    discovery_endpoint: Url,
) -> Result<OpenIdConfiguration, RequestError> {
    let response = client
        .get(discovery_endpoint)
        .send()
        .await
        .context(SendSnafu {})?;

    let status = response.status();
    if !status.is_success() {
        return Err(StatusSnafu { status }.build());
    }

    response
        .json::<OpenIdConfiguration>()
        .await
        .context(DecodeSnafu {})
}

/// Exchanges an authorization code (plus the PKCE verifier that belongs to it)
/// for a token set. Not retried: a rejected code stays rejected, the user has
/// to start a fresh login.
pub(crate) async fn exchange_code_for_token(
    client: &reqwest::Client,
    token_endpoint: Url,
    client_id: &str,
    redirect_uri: &str,
    code: &str,
    code_verifier: &str,
) -> Result<TokenSet, RequestError> {
    let params = [
        ("grant_type", "authorization_code"),
        ("client_id", client_id),
        ("redirect_uri", redirect_uri),
        ("code", code),
        ("code_verifier", code_verifier),
    ];

    match client
        .post(token_endpoint)
        .form(&params)
        .send()
        .await
        .context(SendSnafu {})?
        .json::<TokenResponse>()
        .await
        .context(DecodeSnafu {})?
    {
        TokenResponse::Success(success) => Ok(success.into()),
        TokenResponse::Error(error) => Err(ErrResponseSnafu {
            error_response: error,
        }
        .build()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assertr::prelude::*;
    use mockito::Matcher;

    fn discovery_document(server_url: &str) -> serde_json::Value {
        serde_json::json!({
            "issuer": server_url,
            "authorization_endpoint": format!("{server_url}/oauth/authorize"),
            "token_endpoint": format!("{server_url}/oauth/token"),
        })
    }

    #[tokio::test]
    async fn retrieves_openid_configuration() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/.well-known/openid-configuration")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(discovery_document(&server.url()).to_string())
            .create_async()
            .await;

        let endpoint =
            Url::parse(&format!("{}/.well-known/openid-configuration", server.url())).unwrap();
        let config = retrieve_openid_configuration(&reqwest::Client::new(), endpoint)
            .await
            .unwrap();

        assert_that(config.authorization_endpoint.as_str())
            .is_equal_to(format!("{}/oauth/authorize", server.url()).as_str());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn discovery_propagates_unexpected_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/.well-known/openid-configuration")
            .with_status(503)
            .create_async()
            .await;

        let endpoint =
            Url::parse(&format!("{}/.well-known/openid-configuration", server.url())).unwrap();
        let err = retrieve_openid_configuration(&reqwest::Client::new(), endpoint)
            .await
            .unwrap_err();

        match err {
            RequestError::Status { status } => {
                assert_that(status.as_u16()).is_equal_to(503);
            }
            other => panic!("expected a status error, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn exchanges_code_for_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/oauth/token")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
                Matcher::UrlEncoded("client_id".into(), "client-abc".into()),
                Matcher::UrlEncoded("redirect_uri".into(), "https://shop.example.com/account/callback".into()),
                Matcher::UrlEncoded("code".into(), "abc123".into()),
                Matcher::UrlEncoded("code_verifier".into(), "verifier-value".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!({
                    "access_token": "tok1",
                    "token_type": "Bearer",
                    "expires_in": 3600,
                    "refresh_token": "refresh1"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let endpoint = Url::parse(&format!("{}/oauth/token", server.url())).unwrap();
        let tokens = exchange_code_for_token(
            &reqwest::Client::new(),
            endpoint,
            "client-abc",
            "https://shop.example.com/account/callback",
            "abc123",
            "verifier-value",
        )
        .await
        .unwrap();

        assert_that(tokens.access_token.as_str()).is_equal_to("tok1");
        assert_that(tokens.expires_in).is_equal_to(3600);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn exchange_surfaces_provider_errors() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/oauth/token")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!({
                    "error": "invalid_grant",
                    "error_description": "Code expired"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let endpoint = Url::parse(&format!("{}/oauth/token", server.url())).unwrap();
        let err = exchange_code_for_token(
            &reqwest::Client::new(),
            endpoint,
            "client-abc",
            "https://shop.example.com/account/callback",
            "abc123",
            "verifier-value",
        )
        .await
        .unwrap_err();

        match err {
            RequestError::ErrResponse { error_response } => {
                assert_that(error_response.message().as_str()).is_equal_to("Code expired");
            }
            other => panic!("expected an error response, got: {other:?}"),
        }
    }
}
