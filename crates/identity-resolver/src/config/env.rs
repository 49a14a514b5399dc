//! Environment variable loading for configuration

use std::env;
use std::net::IpAddr;
use std::time::Duration;

use url::Url;

use super::builder::ConfigBuilder;
use crate::Result;

/// Environment variable names
mod vars {
    pub const ENABLE_AUTH: &str = "ENABLE_AUTH";
    pub const USER_ROLES_CLAIM: &str = "USER_ROLES_CLAIM";
    pub const JWT_ISSUER: &str = "JWT_ISSUER";
    pub const JWT_AUDIENCE: &str = "JWT_AUDIENCE";
    pub const JWT_JWKS_URI: &str = "JWT_JWKS_URI";
    pub const JWT_HS_SECRET: &str = "JWT_HS_SECRET";
    pub const JWT_CLOCK_SKEW_SECS: &str = "JWT_CLOCK_SKEW_SECS";
    pub const IDENTITY_HTTP_HOST: &str = "IDENTITY_HTTP_HOST";
    pub const IDENTITY_HTTP_PORT: &str = "IDENTITY_HTTP_PORT";
    pub const IDENTITY_CORS_ORIGIN: &str = "IDENTITY_CORS_ORIGIN";
    pub const RUST_LOG: &str = "RUST_LOG";
    pub const IDENTITY_JSON_LOGS: &str = "IDENTITY_JSON_LOGS";
}

/// Load configuration from environment variables
pub fn load_from_env(mut builder: ConfigBuilder) -> Result<ConfigBuilder> {
    if let Ok(val) = env::var(vars::ENABLE_AUTH) {
        builder = builder.auth_enabled(parse_auth_flag(&val)?);
    }

    if let Ok(claim) = env::var(vars::USER_ROLES_CLAIM) {
        builder = builder.user_roles_claim(claim);
    }

    // JWT decoding
    if let Ok(issuer) = env::var(vars::JWT_ISSUER) {
        builder = builder.jwt_issuer(parse_url(vars::JWT_ISSUER, &issuer)?);
    }

    if let Ok(audience) = env::var(vars::JWT_AUDIENCE) {
        builder = builder.jwt_audience(parse_list(&audience));
    }

    if let Ok(uri) = env::var(vars::JWT_JWKS_URI) {
        builder = builder.jwks_uri(parse_url(vars::JWT_JWKS_URI, &uri)?);
    }

    if let Ok(secret) = env::var(vars::JWT_HS_SECRET) {
        builder = builder.hs_secret(secret);
    }

    if let Ok(secs_str) = env::var(vars::JWT_CLOCK_SKEW_SECS)
        && let Ok(secs) = secs_str.parse::<u64>()
    {
        builder = builder.clock_skew(Duration::from_secs(secs));
    }

    // Transport
    if let Ok(host_str) = env::var(vars::IDENTITY_HTTP_HOST)
        && let Ok(host) = host_str.parse::<IpAddr>()
    {
        builder = builder.http_host(host);
    }

    if let Ok(port_str) = env::var(vars::IDENTITY_HTTP_PORT)
        && let Ok(port) = port_str.parse::<u16>()
    {
        builder = builder.http_port(port);
    }

    if let Ok(origin) = env::var(vars::IDENTITY_CORS_ORIGIN) {
        builder = builder.cors_origin(Some(origin));
    }

    // Telemetry
    if let Ok(level) = env::var(vars::RUST_LOG) {
        builder = builder.log_level(level);
    }

    if let Ok(val) = env::var(vars::IDENTITY_JSON_LOGS) {
        builder = builder.json_logs(parse_bool(&val));
    }

    Ok(builder)
}

fn parse_url(var: &str, value: &str) -> Result<Url> {
    Url::parse(value).map_err(|e| crate::Error::Config(format!("Invalid {var}: {e}")))
}

fn parse_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn parse_bool(s: &str) -> bool {
    matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

/// Authentication is only switched off by an explicit false value; anything
/// unrecognised is rejected rather than read as "off"
fn parse_auth_flag(s: &str) -> Result<bool> {
    match s.trim().to_lowercase().as_str() {
        "false" | "0" | "no" | "off" => Ok(false),
        "true" | "1" | "yes" | "on" => Ok(true),
        _ => Err(crate::Error::Config(format!(
            "Invalid {}: '{s}' (expected true or false)",
            vars::ENABLE_AUTH
        ))),
    }
}
