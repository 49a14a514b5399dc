//! Resolves the identity of an authenticated caller from the access token
//! and id token cookies issued by an OIDC provider.

pub mod auth;
pub mod config;
mod constants;
mod error;
pub mod identity;
pub mod observability;
#[cfg(feature = "http")]
pub mod transport;

pub use auth::{AuthError, ClaimsDecoder, JwtConfig};
#[cfg(feature = "jwt")]
pub use auth::{JwksCache, JwtDecoder};
pub use config::{Config, ConfigBuilder, TelemetryConfig, TransportConfig};
pub use constants::{
    ACCESS_TOKEN_COOKIE, DEFAULT_ROLE, DEFAULT_USER_ROLES_CLAIM, ID_TOKEN_COOKIE,
    MISSING_USERNAME_MESSAGE, TOKEN_VERIFICATION_UNAVAILABLE_MESSAGE, USERNAME_CLAIM,
};
pub use error::{Error, Result};
pub use identity::{
    ClaimSet, ClaimValue, ErrorBody, IdentityConfig, IdentityError, IdentityRecord,
    IdentityResolver, IdentityService, ResolutionError, TokenKind,
};
