//! Identity resolution configuration

use crate::constants::DEFAULT_USER_ROLES_CLAIM;

/// Process-wide settings read once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityConfig {
    /// When false, every request gets the static identity
    pub auth_enabled: bool,
    /// Claim name carrying the caller's roles or groups
    pub user_roles_claim: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            auth_enabled: true,
            user_roles_claim: DEFAULT_USER_ROLES_CLAIM.to_string(),
        }
    }
}

impl IdentityConfig {
    #[must_use]
    pub fn new(user_roles_claim: impl Into<String>) -> Self {
        Self {
            user_roles_claim: user_roles_claim.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub const fn with_auth_enabled(mut self, enabled: bool) -> Self {
        self.auth_enabled = enabled;
        self
    }
}
