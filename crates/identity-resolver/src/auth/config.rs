//! Token decoding configuration

use std::time::Duration;

use url::Url;

/// Well-known path of the signing key set below an OIDC issuer
const JWKS_PATH: &str = ".well-known/jwks.json";

/// JWT decoding configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Expected `iss` claim; also the base for JWKS discovery
    pub issuer: Option<Url>,
    /// Accepted audiences (empty = audience not checked)
    pub audience: Vec<String>,
    /// Explicit JWKS URI, overrides discovery from the issuer
    pub jwks_uri: Option<Url>,
    /// Clock skew tolerance for exp/nbf validation
    pub clock_skew: Duration,
    /// HS256/384/512 secret for symmetric signing (testing/dev only)
    pub hs_secret: Option<String>,
    /// JWKS cache TTL
    pub jwks_cache_ttl: Duration,
}

// Custom Debug impl that redacts hs_secret for security
impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("jwks_uri", &self.jwks_uri)
            .field("clock_skew", &self.clock_skew)
            .field("has_hs_secret", &self.hs_secret.is_some())
            .field("jwks_cache_ttl", &self.jwks_cache_ttl)
            .finish()
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl JwtConfig {
    pub const DEFAULT_CLOCK_SKEW: Duration = Duration::from_secs(60);
    pub const DEFAULT_JWKS_CACHE_TTL: Duration = Duration::from_secs(3600);

    #[must_use]
    pub const fn new() -> Self {
        Self {
            issuer: None,
            audience: Vec::new(),
            jwks_uri: None,
            clock_skew: Self::DEFAULT_CLOCK_SKEW,
            hs_secret: None,
            jwks_cache_ttl: Self::DEFAULT_JWKS_CACHE_TTL,
        }
    }

    #[must_use]
    pub fn with_issuer(mut self, issuer: Url) -> Self {
        self.issuer = Some(issuer);
        self
    }

    #[must_use]
    pub fn with_audience(mut self, audience: Vec<String>) -> Self {
        self.audience = audience;
        self
    }

    #[must_use]
    pub fn with_jwks_uri(mut self, uri: Url) -> Self {
        self.jwks_uri = Some(uri);
        self
    }

    #[must_use]
    pub fn with_hs_secret(mut self, secret: String) -> Self {
        self.hs_secret = Some(secret);
        self
    }

    /// Key set location: the explicit URI, else `<issuer>/.well-known/jwks.json`
    pub fn jwks_uri(&self) -> Option<Url> {
        if let Some(uri) = &self.jwks_uri {
            return Some(uri.clone());
        }
        let issuer = self.issuer.as_ref()?;
        let base = format!("{}/", issuer.as_str().trim_end_matches('/'));
        Url::parse(&base).and_then(|b| b.join(JWKS_PATH)).ok()
    }

    /// Whether any source of verification keys is configured
    pub const fn has_key_source(&self) -> bool {
        self.hs_secret.is_some() || self.jwks_uri.is_some() || self.issuer.is_some()
    }
}
