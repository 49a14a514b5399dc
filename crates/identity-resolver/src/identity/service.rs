//! Get-identity operation: decode both tokens, then resolve

use std::sync::Arc;

use super::claims::ClaimSet;
use super::config::IdentityConfig;
use super::error::{IdentityError, TokenKind};
use super::record::IdentityRecord;
use super::resolver::IdentityResolver;
use crate::auth::ClaimsDecoder;

/// Identity service shared by all requests
#[derive(Clone)]
pub struct IdentityService {
    resolver: IdentityResolver,
    decoder: Arc<dyn ClaimsDecoder>,
}

impl std::fmt::Debug for IdentityService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityService")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

impl IdentityService {
    #[must_use]
    pub fn new(config: IdentityConfig, decoder: Arc<dyn ClaimsDecoder>) -> Self {
        Self {
            resolver: IdentityResolver::new(config),
            decoder,
        }
    }

    pub const fn resolver(&self) -> &IdentityResolver {
        &self.resolver
    }

    pub const fn auth_enabled(&self) -> bool {
        self.resolver.config().auth_enabled
    }

    /// Resolve the caller from the raw cookie values.
    ///
    /// With authentication disabled the static identity is returned and the
    /// decoder is never called. Absent tokens are treated as empty claim sets.
    pub async fn get_identity(
        &self,
        access_token: Option<&str>,
        id_token: Option<&str>,
    ) -> Result<IdentityRecord, IdentityError> {
        if !self.auth_enabled() {
            tracing::debug!("Authentication disabled, returning static identity");
            return Ok(self.resolver.resolve_with_auth_disabled());
        }

        let access = self.decode(TokenKind::Access, access_token).await?;
        let identity = self.decode(TokenKind::Id, id_token).await?;

        Ok(self.resolver.resolve(&access, &identity)?)
    }

    async fn decode(&self, kind: TokenKind, token: Option<&str>) -> Result<ClaimSet, IdentityError> {
        let Some(token) = token else {
            tracing::debug!(token = %kind, "Token absent, using empty claim set");
            return Ok(ClaimSet::new());
        };

        self.decoder.decode(token).await.map_err(|source| {
            // Do not log token content
            if source.is_token_rejected() {
                tracing::warn!(token = %kind, error = %source, "Token rejected");
            } else {
                tracing::error!(token = %kind, error = %source, "Token verification failed");
            }
            IdentityError::from_auth(kind, source)
        })
    }
}
