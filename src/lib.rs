//! Customer login for Shopify storefronts, built on the Customer Account API's
//! OAuth 2.0 Authorization Code flow with PKCE.
//!
//! The crate exposes a small axum router handling the whole browser-facing flow:
//! redirecting to the provider's hosted login, validating the callback, exchanging
//! the authorization code for tokens, and keeping the resulting session entirely
//! in scoped browser cookies. `/account/me` additionally proxies an authenticated
//! GraphQL query so the storefront can render the logged-in customer.
//!
//! ```no_run
//! use storefront_auth::{AppState, AuthConfig};
//! use url::Url;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AuthConfig {
//!         shop_id: "12345678".to_owned(),
//!         client_id: "shp_1234".to_owned(),
//!         app_url: Url::parse("https://shop.example.com")?,
//!         provider_base_url: AuthConfig::default_provider_base_url(),
//!         scope: AuthConfig::default_scope(),
//!         cookie_secure: true,
//!     };
//!     let state = AppState::new(config)?;
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//!     axum::serve(listener, storefront_auth::router(state).into_make_service()).await?;
//!     Ok(())
//! }
//! ```

mod code_verifier;
pub mod config;
mod csrf_token;
pub mod customer_api;
pub mod discovery;
pub mod error;
mod login;
mod oidc;
mod request;
mod response;
mod routes;
pub mod session;
pub mod state;
mod token;

// Library exports (additional to pub modules).
pub use config::AuthConfig;
pub use error::AuthError;
pub use oidc::OpenIdConfiguration;
pub use request::RequestError;
pub use response::{ErrorResponse, KnownOidcErrorCode, OidcErrorCode};
pub use routes::router;
pub use state::AppState;
