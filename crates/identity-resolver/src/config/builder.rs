//! Configuration builder

use std::net::IpAddr;
use std::time::Duration;

use url::Url;

use crate::Error;
use crate::auth::JwtConfig;
use crate::constants::{DEFAULT_HTTP_HOST, DEFAULT_HTTP_PORT, DEFAULT_REQUEST_TIMEOUT};
use crate::identity::IdentityConfig;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub identity: IdentityConfig,
    pub jwt: JwtConfig,
    pub transport: TransportConfig,
    pub telemetry: TelemetryConfig,
}

impl Config {
    #[must_use]
    pub const fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    #[must_use]
    pub const fn auth_enabled(&self) -> bool {
        self.identity.auth_enabled
    }
}

/// HTTP listener configuration
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub http_host: IpAddr,
    pub http_port: u16,
    /// Allowed CORS origin for the browser front end
    pub cors_origin: Option<String>,
    pub request_timeout: Duration,
}

impl TransportConfig {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            http_host: DEFAULT_HTTP_HOST,
            http_port: DEFAULT_HTTP_PORT,
            cors_origin: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub json_logs: bool,
}

/// Configuration builder with fluent API
#[derive(Debug)]
pub struct ConfigBuilder {
    auth_enabled: bool,
    user_roles_claim: Option<String>,
    jwt: JwtConfig,
    transport: TransportConfig,
    telemetry: TelemetryConfig,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            auth_enabled: true,
            user_roles_claim: None,
            jwt: JwtConfig::new(),
            transport: TransportConfig::new(),
            telemetry: TelemetryConfig {
                log_level: String::new(),
                json_logs: false,
            },
        }
    }

    #[must_use]
    pub const fn auth_enabled(mut self, enabled: bool) -> Self {
        self.auth_enabled = enabled;
        self
    }

    #[must_use]
    pub fn user_roles_claim(mut self, claim: String) -> Self {
        self.user_roles_claim = Some(claim);
        self
    }

    #[must_use]
    pub fn jwt_issuer(mut self, issuer: Url) -> Self {
        self.jwt.issuer = Some(issuer);
        self
    }

    #[must_use]
    pub fn jwt_audience(mut self, audience: Vec<String>) -> Self {
        self.jwt.audience = audience;
        self
    }

    #[must_use]
    pub fn jwks_uri(mut self, uri: Url) -> Self {
        self.jwt.jwks_uri = Some(uri);
        self
    }

    #[must_use]
    pub fn hs_secret(mut self, secret: String) -> Self {
        self.jwt.hs_secret = Some(secret);
        self
    }

    #[must_use]
    pub const fn clock_skew(mut self, skew: Duration) -> Self {
        self.jwt.clock_skew = skew;
        self
    }

    #[must_use]
    pub const fn jwks_cache_ttl(mut self, ttl: Duration) -> Self {
        self.jwt.jwks_cache_ttl = ttl;
        self
    }

    #[must_use]
    pub const fn http_host(mut self, host: IpAddr) -> Self {
        self.transport.http_host = host;
        self
    }

    #[must_use]
    pub const fn http_port(mut self, port: u16) -> Self {
        self.transport.http_port = port;
        self
    }

    #[must_use]
    pub fn cors_origin(mut self, origin: Option<String>) -> Self {
        self.transport.cors_origin = origin;
        self
    }

    #[must_use]
    pub const fn request_timeout(mut self, timeout: Duration) -> Self {
        self.transport.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn log_level(mut self, level: String) -> Self {
        self.telemetry.log_level = level;
        self
    }

    #[must_use]
    pub const fn json_logs(mut self, enabled: bool) -> Self {
        self.telemetry.json_logs = enabled;
        self
    }

    /// Build the configuration
    pub fn build(self) -> crate::Result<Config> {
        let user_roles_claim = self
            .user_roles_claim
            .unwrap_or_else(|| IdentityConfig::default().user_roles_claim);

        if user_roles_claim.trim().is_empty() {
            return Err(Error::Config("user_roles_claim must not be empty".into()));
        }

        if self.auth_enabled && !self.jwt.has_key_source() {
            return Err(Error::Config(
                "authentication is enabled but no JWT issuer, JWKS URI or HS secret is configured"
                    .into(),
            ));
        }

        let log_level = if self.telemetry.log_level.is_empty() {
            "info".to_string()
        } else {
            self.telemetry.log_level
        };

        Ok(Config {
            identity: IdentityConfig {
                auth_enabled: self.auth_enabled,
                user_roles_claim,
            },
            jwt: self.jwt,
            transport: self.transport,
            telemetry: TelemetryConfig {
                log_level,
                json_logs: self.telemetry.json_logs,
            },
        })
    }
}
