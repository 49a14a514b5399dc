//! JWKS fetching and caching

use std::collections::HashMap;
use std::time::{Duration, Instant};

use jsonwebtoken::{Algorithm, DecodingKey};
use parking_lot::RwLock;
use serde::Deserialize;
use url::Url;

use super::error::{AuthError, Result};

/// Minimum time between refreshes triggered by an unknown `kid`
const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// JSON Web Key
#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    #[serde(default)]
    pub kid: Option<String>,
    pub kty: String,
    #[serde(default)]
    pub alg: Option<String>,
    // RSA components
    #[serde(default)]
    pub n: Option<String>,
    #[serde(default)]
    pub e: Option<String>,
    // EC components
    #[serde(default)]
    pub crv: Option<String>,
    #[serde(default)]
    pub x: Option<String>,
    #[serde(default)]
    pub y: Option<String>,
}

/// JSON Web Key Set
#[derive(Debug, Clone, Deserialize)]
pub struct JwkSet {
    pub keys: Vec<Jwk>,
}

#[derive(Clone)]
struct JwkEntry {
    key: DecodingKey,
    algorithm: Algorithm,
}

/// Verification keys of the identity provider, refreshed after a TTL
pub struct JwksCache {
    keys: RwLock<HashMap<String, JwkEntry>>,
    unnamed_keys: RwLock<Vec<JwkEntry>>,
    jwks_uri: Url,
    client: reqwest::Client,
    ttl: Duration,
    last_refresh: RwLock<Option<Instant>>,
}

impl std::fmt::Debug for JwksCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwksCache")
            .field("jwks_uri", &self.jwks_uri)
            .field("ttl", &self.ttl)
            .field("keys_count", &self.keys.read().len())
            .finish_non_exhaustive()
    }
}

impl JwksCache {
    pub fn new(jwks_uri: Url, ttl: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AuthError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            keys: RwLock::new(HashMap::new()),
            unnamed_keys: RwLock::new(Vec::new()),
            jwks_uri,
            client,
            ttl,
            last_refresh: RwLock::new(None),
        })
    }

    /// Key for `kid`, or the first key matching `alg` when the token has no `kid`
    pub async fn get_key(&self, kid: Option<&str>, alg: Algorithm) -> Result<DecodingKey> {
        if self.needs_refresh() {
            self.refresh().await?;
        }

        if let Some(kid) = kid {
            if let Some(key) = self.lookup_kid(kid, alg) {
                return Ok(key);
            }

            // Unknown kid usually means the provider rotated its keys
            if !self.refreshed_recently() {
                tracing::debug!(kid, "Unknown key id, refreshing JWKS");
                self.refresh().await?;
                if let Some(key) = self.lookup_kid(kid, alg) {
                    return Ok(key);
                }
            }

            return Err(AuthError::KeyNotFound(kid.to_string()));
        }

        let unnamed = self
            .unnamed_keys
            .read()
            .iter()
            .find(|entry| entry.algorithm == alg)
            .map(|entry| entry.key.clone());
        if let Some(key) = unnamed {
            return Ok(key);
        }

        self.keys
            .read()
            .values()
            .find(|entry| entry.algorithm == alg)
            .map(|entry| entry.key.clone())
            .ok_or(AuthError::NoMatchingKey)
    }

    /// Refresh JWKS from remote
    pub async fn refresh(&self) -> Result<()> {
        tracing::debug!(jwks_uri = %self.jwks_uri, "Refreshing JWKS");

        let response = self
            .client
            .get(self.jwks_uri.clone())
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| AuthError::JwksFetch(e.to_string()))?;

        let jwks: JwkSet = response
            .json()
            .await
            .map_err(|e| AuthError::JwksParse(e.to_string()))?;

        self.install(jwks);

        tracing::info!(keys_count = self.keys_count(), "JWKS refreshed");
        Ok(())
    }

    fn install(&self, jwks: JwkSet) {
        let mut keys = HashMap::new();
        let mut unnamed = Vec::new();

        for jwk in jwks.keys {
            let (key, algorithm) = match decode_jwk(&jwk) {
                Ok(Some(decoded)) => decoded,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(kid = ?jwk.kid, error = %e, "Skipping malformed JWK");
                    continue;
                }
            };

            let entry = JwkEntry { key, algorithm };
            match jwk.kid {
                Some(kid) => {
                    keys.insert(kid, entry);
                }
                None => unnamed.push(entry),
            }
        }

        *self.keys.write() = keys;
        *self.unnamed_keys.write() = unnamed;
        *self.last_refresh.write() = Some(Instant::now());
    }

    fn lookup_kid(&self, kid: &str, alg: Algorithm) -> Option<DecodingKey> {
        self.keys
            .read()
            .get(kid)
            .filter(|entry| entry.algorithm == alg)
            .map(|entry| entry.key.clone())
    }

    fn needs_refresh(&self) -> bool {
        self.last_refresh
            .read()
            .is_none_or(|t| t.elapsed() > self.ttl)
    }

    /// Unknown-kid refreshes are limited to one per `MIN_REFRESH_INTERVAL`
    fn refreshed_recently(&self) -> bool {
        self.last_refresh
            .read()
            .is_some_and(|t| t.elapsed() < MIN_REFRESH_INTERVAL)
    }

    pub fn keys_count(&self) -> usize {
        self.keys.read().len() + self.unnamed_keys.read().len()
    }
}

fn decode_jwk(jwk: &Jwk) -> Result<Option<(DecodingKey, Algorithm)>> {
    let alg = match jwk.alg.as_deref() {
        Some("RS256") => Algorithm::RS256,
        Some("RS384") => Algorithm::RS384,
        Some("RS512") => Algorithm::RS512,
        Some("ES256") => Algorithm::ES256,
        Some("ES384") => Algorithm::ES384,
        None => match (jwk.kty.as_str(), jwk.crv.as_deref()) {
            ("RSA", _) => Algorithm::RS256,
            ("EC", Some("P-256")) => Algorithm::ES256,
            ("EC", Some("P-384")) => Algorithm::ES384,
            _ => return Ok(None),
        },
        Some(other) => {
            tracing::debug!(alg = other, "Skipping key with unsupported algorithm");
            return Ok(None);
        }
    };

    let missing = |part: &str| AuthError::JwksParse(format!("Missing '{part}' in {} key", jwk.kty));

    let key = match jwk.kty.as_str() {
        "RSA" => {
            let n = jwk.n.as_deref().ok_or_else(|| missing("n"))?;
            let e = jwk.e.as_deref().ok_or_else(|| missing("e"))?;
            DecodingKey::from_rsa_components(n, e)
                .map_err(|e| AuthError::JwksParse(format!("Invalid RSA components: {e}")))?
        }
        "EC" => {
            let x = jwk.x.as_deref().ok_or_else(|| missing("x"))?;
            let y = jwk.y.as_deref().ok_or_else(|| missing("y"))?;
            DecodingKey::from_ec_components(x, y)
                .map_err(|e| AuthError::JwksParse(format!("Invalid EC components: {e}")))?
        }
        other => {
            tracing::debug!(kty = other, "Skipping unsupported key type");
            return Ok(None);
        }
    };

    Ok(Some((key, alg)))
}
