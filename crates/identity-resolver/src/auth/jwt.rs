//! JWT decoding and validation

use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode_header};

use super::config::JwtConfig;
use super::decoder::ClaimsDecoder;
use super::error::{AuthError, Result};
use super::jwks::JwksCache;
use crate::identity::ClaimSet;

/// Decodes tokens with `jsonwebtoken`, verifying signature and expiry
pub struct JwtDecoder {
    config: JwtConfig,
    jwks_cache: Option<Arc<JwksCache>>,
    hs_key: Option<DecodingKey>,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("issuer", &self.config.issuer)
            .field("has_jwks_cache", &self.jwks_cache.is_some())
            .field("has_hs_key", &self.hs_key.is_some())
            .finish()
    }
}

impl JwtDecoder {
    #[must_use]
    pub fn new(config: JwtConfig, jwks_cache: Option<Arc<JwksCache>>) -> Self {
        let hs_key = config
            .hs_secret
            .as_ref()
            .map(|s| DecodingKey::from_secret(s.as_bytes()));
        Self {
            config,
            jwks_cache,
            hs_key,
        }
    }

    /// Build a decoder with a JWKS cache when a key set location is known
    pub fn from_config(config: JwtConfig) -> Result<Self> {
        let jwks_cache = match config.jwks_uri() {
            Some(uri) => {
                tracing::info!(jwks_uri = %uri, "Using JWKS for asymmetric token verification");
                Some(Arc::new(JwksCache::new(uri, config.jwks_cache_ttl)?))
            }
            None => None,
        };
        Ok(Self::new(config, jwks_cache))
    }

    fn validation(&self, alg: Algorithm) -> Validation {
        let mut validation = Validation::new(alg);

        if let Some(issuer) = &self.config.issuer {
            // Normalize issuer by removing trailing slash for comparison
            validation.set_issuer(&[issuer.as_str().trim_end_matches('/')]);
        }

        if self.config.audience.is_empty() {
            validation.validate_aud = false;
        } else {
            validation.set_audience(&self.config.audience);
        }

        validation.leeway = self.config.clock_skew.as_secs();
        validation
    }

    async fn get_decoding_key(&self, kid: Option<&str>, alg: Algorithm) -> Result<DecodingKey> {
        if matches!(alg, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return self
                .hs_key
                .clone()
                .ok_or_else(|| AuthError::Config("HS secret not configured".into()));
        }

        let jwks_cache = self.jwks_cache.as_ref().ok_or_else(|| {
            AuthError::Config("JWKS not configured for asymmetric algorithm".into())
        })?;

        jwks_cache.get_key(kid, alg).await
    }
}

#[async_trait]
impl ClaimsDecoder for JwtDecoder {
    async fn decode(&self, token: &str) -> Result<ClaimSet> {
        let header = decode_header(token).map_err(|_| AuthError::InvalidToken)?;

        let key = self
            .get_decoding_key(header.kid.as_deref(), header.alg)
            .await?;

        let token_data = jsonwebtoken::decode::<serde_json::Map<String, serde_json::Value>>(
            token,
            &key,
            &self.validation(header.alg),
        )?;

        Ok(ClaimSet::from_json_map(token_data.claims))
    }
}
