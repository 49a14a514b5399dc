//! Token decoding
//!
//! Turns raw token strings into [`ClaimSet`](crate::identity::ClaimSet)s.
//!
//! # Features
//!
//! - `ClaimsDecoder` trait, the only thing the identity service depends on
//! - JWT validation with RS256/ES256/HS256 support via `jsonwebtoken` (`jwt` feature)
//! - JWKS fetching with TTL-based key rotation (`jwt` feature)

mod config;
mod decoder;
mod error;
#[cfg(feature = "jwt")]
mod jwks;
#[cfg(feature = "jwt")]
mod jwt;

pub use config::JwtConfig;
pub use decoder::ClaimsDecoder;
pub use error::{AuthError, Result};
#[cfg(feature = "jwt")]
pub use jwks::{Jwk, JwkSet, JwksCache};
#[cfg(feature = "jwt")]
pub use jwt::JwtDecoder;
