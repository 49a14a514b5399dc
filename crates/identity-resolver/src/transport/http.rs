//! HTTP transport: the get-identity endpoint

use std::future::Future;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::cookies::TokenCookies;
use crate::config::{Config, TransportConfig};
use crate::constants::{DEFAULT_CORS_ORIGIN, STATUS_OK};
use crate::identity::{IdentityError, IdentityRecord, IdentityService};
use crate::{Error, Result};

/// Health check response
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    auth_enabled: bool,
}

impl IntoResponse for IdentityError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.body())).into_response()
    }
}

/// Build the application router
pub fn router(service: IdentityService, transport: &TransportConfig) -> Router {
    Router::new()
        .route("/get-identity", get(get_identity_handler))
        .route("/api/get-identity", get(get_identity_handler))
        .route("/health", get(health_handler))
        .with_state(service)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            transport.request_timeout,
        ))
        .layer(build_cors_layer(transport))
}

/// Run the HTTP server until `shutdown` resolves
pub async fn run_http(
    service: IdentityService,
    config: &Config,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let transport = &config.transport;
    let addr = SocketAddr::new(transport.http_host, transport.http_port);

    emit_security_warnings(transport, config.auth_enabled());

    let app = router(service, transport);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Transport(format!("Failed to bind to {addr}: {e}")))?;

    tracing::info!("HTTP server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| Error::Transport(format!("HTTP server error: {e}")))?;

    tracing::info!("HTTP server shutdown complete");
    Ok(())
}

async fn get_identity_handler(
    State(service): State<IdentityService>,
    headers: HeaderMap,
) -> std::result::Result<Json<IdentityRecord>, IdentityError> {
    let tokens = TokenCookies::from_headers(&headers);

    let record = service
        .get_identity(tokens.access_token.as_deref(), tokens.id_token.as_deref())
        .await?;

    tracing::debug!(roles = record.user_roles.len(), "Identity resolved");
    Ok(Json(record))
}

async fn health_handler(State(service): State<IdentityService>) -> impl IntoResponse {
    Json(HealthResponse {
        status: STATUS_OK,
        version: env!("CARGO_PKG_VERSION"),
        auth_enabled: service.auth_enabled(),
    })
}

fn build_cors_layer(config: &TransportConfig) -> CorsLayer {
    let origin = config
        .cors_origin
        .as_deref()
        .and_then(|o| o.parse::<HeaderValue>().ok())
        .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CORS_ORIGIN));

    // Tokens travel as cookies, so credentials must be allowed
    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

fn emit_security_warnings(config: &TransportConfig, auth_enabled: bool) {
    let host = config.http_host;
    let is_non_loopback = !host.is_loopback();
    let is_all_interfaces =
        host == IpAddr::V4(Ipv4Addr::UNSPECIFIED) || host == IpAddr::V6(Ipv6Addr::UNSPECIFIED);

    if is_all_interfaces {
        tracing::warn!(
            "HTTP server binding to all interfaces. \
             This exposes the server to all network interfaces."
        );
    } else if is_non_loopback {
        tracing::warn!(
            "HTTP server binding to non-loopback address ({host}). \
             Ensure network security policies are in place."
        );
    }

    if !auth_enabled && is_non_loopback {
        tracing::warn!(
            "SECURITY WARNING: authentication is disabled and every caller receives the \
             static admin identity. Set ENABLE_AUTH=true outside local development."
        );
    }

    if config.cors_origin.is_none() {
        tracing::info!(
            "CORS origin not configured (IDENTITY_CORS_ORIGIN). \
             Using restrictive default: {DEFAULT_CORS_ORIGIN}"
        );
    }
}
