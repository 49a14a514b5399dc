//! Identity resolution error types

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::AuthError;
use crate::constants::{MISSING_USERNAME_MESSAGE, TOKEN_VERIFICATION_UNAVAILABLE_MESSAGE};

/// Failure to build an identity from otherwise well-formed claims
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("{}", MISSING_USERNAME_MESSAGE)]
    MissingUsername,
}

impl ResolutionError {
    /// User-facing message
    pub const fn message(&self) -> &'static str {
        match self {
            Self::MissingUsername => MISSING_USERNAME_MESSAGE,
        }
    }

    /// HTTP status reported to the caller
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::MissingUsername => 400,
        }
    }
}

/// Which cookie a token came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Id,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Access => write!(f, "access"),
            Self::Id => write!(f, "id"),
        }
    }
}

/// Any failure of the get-identity operation
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("failed to decode {token} token: {source}")]
    Decode {
        token: TokenKind,
        #[source]
        source: AuthError,
    },

    /// The token could not be checked: key set unreachable or decoder misconfigured
    #[error("failed to verify {token} token: {source}")]
    Verification {
        token: TokenKind,
        #[source]
        source: AuthError,
    },

    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

impl IdentityError {
    /// Classify a decoder failure: rejected tokens are the caller's problem,
    /// key and configuration failures are ours
    pub const fn from_auth(token: TokenKind, source: AuthError) -> Self {
        if source.is_token_rejected() {
            Self::Decode { token, source }
        } else {
            Self::Verification { token, source }
        }
    }

    /// User-facing message; decode details stay out of the response
    pub fn message(&self) -> String {
        match self {
            Self::Decode { token, .. } => format!("Invalid {token} token."),
            Self::Verification { .. } => TOKEN_VERIFICATION_UNAVAILABLE_MESSAGE.to_string(),
            Self::Resolution(err) => err.message().to_string(),
        }
    }

    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Decode { .. } => 401,
            Self::Verification {
                source: AuthError::Config(_),
                ..
            } => 500,
            Self::Verification { .. } => 503,
            Self::Resolution(err) => err.status_code(),
        }
    }

    /// Response body for this error
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            message: self.message(),
        }
    }
}

/// JSON body of every error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

impl From<ResolutionError> for ErrorBody {
    fn from(err: ResolutionError) -> Self {
        Self {
            message: err.message().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_username() {
        let err = ResolutionError::MissingUsername;
        assert_eq!(err.message(), "No username present in access or id token.");
        assert_eq!(err.to_string(), err.message());
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_error_body_serialization() {
        let body = ErrorBody::from(ResolutionError::MissingUsername);
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"message":"No username present in access or id token."}"#
        );
    }

    #[test]
    fn test_decode_error_hides_details() {
        let err = IdentityError::Decode {
            token: TokenKind::Id,
            source: AuthError::InvalidSignature,
        };
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.message(), "Invalid id token.");
        assert!(err.to_string().contains("invalid signature"));
    }

    #[test]
    fn test_resolution_error_passthrough() {
        let err = IdentityError::from(ResolutionError::MissingUsername);
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.body().message, MISSING_USERNAME_MESSAGE);
    }

    #[test]
    fn test_rejected_token_is_unauthorized() {
        let err = IdentityError::from_auth(TokenKind::Access, AuthError::TokenExpired);
        assert!(matches!(err, IdentityError::Decode { .. }));
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.message(), "Invalid access token.");
    }

    #[test]
    fn test_key_set_failure_is_unavailable() {
        for source in [
            AuthError::JwksFetch("connection refused".into()),
            AuthError::JwksParse("expected value".into()),
        ] {
            let err = IdentityError::from_auth(TokenKind::Access, source);
            assert!(matches!(err, IdentityError::Verification { .. }));
            assert_eq!(err.status_code(), 503);
            assert_eq!(err.message(), TOKEN_VERIFICATION_UNAVAILABLE_MESSAGE);
            assert!(!err.message().contains("connection refused"));
        }
    }

    #[test]
    fn test_decoder_misconfiguration_is_internal_error() {
        let err = IdentityError::from_auth(
            TokenKind::Id,
            AuthError::Config("no HS secret configured".into()),
        );
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.message(), TOKEN_VERIFICATION_UNAVAILABLE_MESSAGE);
    }

    #[test]
    fn test_token_kind_display() {
        assert_eq!(TokenKind::Access.to_string(), "access");
        assert_eq!(TokenKind::Id.to_string(), "id");
    }
}
