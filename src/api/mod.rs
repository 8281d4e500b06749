//! HTTP surface: router, middleware stack, and server startup.

use anyhow::{anyhow, Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method, Request,
    },
    routing::{get, post},
    Extension, Router,
};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;
use url::Url;
use utoipa_swagger_ui::SwaggerUi;

pub(crate) mod handlers;
mod openapi;

pub use openapi::openapi;

use crate::auth::rate_limit::NoopRateLimiter;
use crate::auth::store::PgAdminStore;
use crate::auth::{AdminStore, AuthConfig, SessionIssuer};
use crate::cli::globals::GlobalArgs;
use handlers::auth::state::AuthState;
use secrecy::ExposeSecret;

/// Start the server.
///
/// # Errors
/// Returns an error if the database is unreachable, the configuration is
/// invalid, or the listener cannot bind.
pub async fn new(port: u16, dsn: String, globals: &GlobalArgs) -> Result<()> {
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&dsn)
        .await
        .context("Failed to connect to database")?;

    let config = AuthConfig::new()
        .with_lockout_threshold(globals.lockout_threshold)
        .with_lockout_duration_seconds(globals.lockout_duration_seconds)
        .with_session_ttl_seconds(globals.session_ttl_seconds)
        .with_recovery_pepper(Arc::from(
            globals.recovery_pepper.expose_secret().as_bytes(),
        ))
        .with_admin_origin(globals.admin_origin.clone());

    let store: Arc<dyn AdminStore> = Arc::new(PgAdminStore::new(pool.clone()));
    let sessions = SessionIssuer::new(&globals.session_secret, config.issuer());
    let auth_state = Arc::new(AuthState::new(
        store,
        config.clone(),
        sessions,
        Arc::new(NoopRateLimiter),
    ));

    let origin = admin_origin(config.admin_origin())?;
    let cors = CorsLayer::new()
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(AllowOrigin::exact(origin))
        .allow_credentials(true);

    let app = Router::new()
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::health::health))
        .route("/v1/admin/auth/login", post(handlers::auth::login))
        .route(
            "/v1/admin/auth/totp/enroll/start",
            post(handlers::auth::mfa::totp_enroll_start),
        )
        .route(
            "/v1/admin/auth/totp/enroll/finish",
            post(handlers::auth::mfa::totp_enroll_finish),
        )
        .route(
            "/v1/admin/auth/totp/verify",
            post(handlers::auth::mfa::totp_verify),
        )
        .route(
            "/v1/admin/auth/session",
            get(handlers::auth::session::session),
        )
        .route("/v1/admin/me", get(handlers::admin::me))
        .route("/v1/admin/totp/reset", post(handlers::admin::totp_reset))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &Request<Body>| {
                        HeaderValue::from_str(Ulid::new().to_string().as_str()).ok()
                    },
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(Extension(auth_state))
                .layer(Extension(pool)),
        );

    let listener = TcpListener::bind(format!("::0:{port}")).await?;
    info!("Listening on port {port}");
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

/// Normalize the configured admin origin into a CORS header value.
fn admin_origin(origin: &str) -> Result<HeaderValue> {
    let url = Url::parse(origin).context("invalid admin origin")?;
    let host = url
        .host_str()
        .ok_or_else(|| anyhow!("admin origin is missing a host"))?;
    let mut value = format!("{}://{host}", url.scheme());
    if let Some(port) = url.port() {
        value.push_str(&format!(":{port}"));
    }
    HeaderValue::from_str(&value).context("admin origin is not a valid header value")
}
