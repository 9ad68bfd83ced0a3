use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use axum::response::Response;
use clap::{Parser, ValueEnum};
use storefront_auth::{AppState, AuthConfig, config, router};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::sensitive_headers::{
    SetSensitiveRequestHeadersLayer, SetSensitiveResponseHeadersLayer,
};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};
use tracing::{Level, Span};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AppEnv {
    Production,
    Development,
}

#[derive(Parser)]
#[command(
    name = "storefront-auth",
    about = "Customer login service for Shopify storefronts"
)]
struct Cli {
    /// The shop id the Customer Account API is registered under.
    #[arg(long, env = "SHOPIFY_CUSTOMER_SHOP_ID")]
    shop_id: String,

    /// The public OAuth client id of the headless storefront.
    #[arg(long, env = "SHOPIFY_CUSTOMER_CLIENT_ID")]
    client_id: String,

    /// The public base URL of the storefront. Callback and post-login
    /// redirects derive from it.
    #[arg(long, env = "APP_URL")]
    app_url: Url,

    /// Base URL of the identity provider.
    #[arg(long, env = "SHOPIFY_BASE_URL", default_value = config::DEFAULT_PROVIDER_BASE_URL)]
    provider_base_url: Url,

    /// In development the session cookies are not marked Secure, so plain
    /// http://localhost works.
    #[arg(long, env = "APP_ENV", value_enum, default_value_t = AppEnv::Production)]
    app_env: AppEnv,

    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:3000")]
    bind_addr: SocketAddr,

    /// Origins allowed to call this service with credentials.
    #[arg(
        long,
        env = "ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_value = "http://localhost:4200,http://localhost:3000"
    )]
    allowed_origins: Vec<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, env = "LOG_JSON", default_value_t = false)]
    json_logs: bool,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

fn cors_layer(allowed_origins: &[String]) -> anyhow::Result<CorsLayer> {
    let origins = allowed_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<http::HeaderValue>()
                .with_context(|| format!("invalid origin: {origin}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    // Credentialed CORS rules out wildcard origins, so the allow-list is
    // always explicit.
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([http::Method::GET, http::Method::POST])
        .allow_headers([http::header::CONTENT_TYPE])
        .allow_credentials(true))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    let config = AuthConfig {
        shop_id: cli.shop_id.clone(),
        client_id: cli.client_id.clone(),
        app_url: cli.app_url.clone(),
        provider_base_url: cli.provider_base_url.clone(),
        scope: AuthConfig::default_scope(),
        cookie_secure: cli.app_env != AppEnv::Development,
    };

    let state = AppState::new(config)?;

    let router = router(state).layer(
        ServiceBuilder::new()
            // Mark the specific headers as sensitive so that they don't show up in logs.
            .layer(SetSensitiveRequestHeadersLayer::new([
                http::header::AUTHORIZATION,
                http::header::COOKIE,
            ]))
            .layer(SetSensitiveResponseHeadersLayer::new([
                http::header::SET_COOKIE,
            ]))
            // Add high level tracing to all requests.
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(
                        DefaultMakeSpan::new()
                            .level(Level::INFO)
                            .include_headers(false),
                    )
                    .on_response(|response: &Response, latency: Duration, _span: &Span| {
                        tracing::info!(
                            status = response.status().as_u16(),
                            latency = format_args!("{} ms", latency.as_millis()),
                            "response"
                        );
                    }),
            )
            // Set a timeout
            .layer(TimeoutLayer::new(Duration::from_secs(60)))
            .layer(cors_layer(&cli.allowed_origins)?),
    );

    let listener = TcpListener::bind(cli.bind_addr)
        .await
        .with_context(|| format!("could not bind {}", cli.bind_addr))?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %cli.bind_addr,
        shop_id = %cli.shop_id,
        "Serving customer auth"
    );
    axum::serve(listener, router.into_make_service()).await?;

    Ok(())
}
