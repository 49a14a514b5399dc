//! Token decoding error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid token")]
    InvalidToken,

    #[error("token expired")]
    TokenExpired,

    #[error("token not yet valid")]
    TokenNotYetValid,

    #[error("invalid issuer")]
    InvalidIssuer,

    #[error("invalid audience")]
    InvalidAudience,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("no matching key for algorithm")]
    NoMatchingKey,

    #[error("JWKS fetch failed: {0}")]
    JwksFetch(String),

    #[error("JWKS parse failed: {0}")]
    JwksParse(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl AuthError {
    /// Whether the token itself was rejected, as opposed to a key or
    /// configuration problem on our side
    #[must_use]
    pub const fn is_token_rejected(&self) -> bool {
        matches!(
            self,
            Self::InvalidToken
                | Self::TokenExpired
                | Self::TokenNotYetValid
                | Self::InvalidIssuer
                | Self::InvalidAudience
                | Self::InvalidSignature
                | Self::KeyNotFound(_)
                | Self::NoMatchingKey
        )
    }
}

#[cfg(feature = "jwt")]
impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => Self::TokenExpired,
            ErrorKind::ImmatureSignature => Self::TokenNotYetValid,
            ErrorKind::InvalidIssuer => Self::InvalidIssuer,
            ErrorKind::InvalidAudience => Self::InvalidAudience,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            _ => Self::InvalidToken,
        }
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
