//! Merges access-token and id-token claims into one identity
//!
//! The id token is authoritative. The access token is consulted only for
//! fields the id token does not carry.

use std::collections::BTreeMap;

use super::claims::{ClaimSet, ClaimValue};
use super::config::IdentityConfig;
use super::error::ResolutionError;
use super::record::IdentityRecord;
use crate::constants::{DEFAULT_ROLE, USERNAME_CLAIM};

/// Stateless identity resolver
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    config: IdentityConfig,
}

impl IdentityResolver {
    #[must_use]
    pub const fn new(config: IdentityConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> &IdentityConfig {
        &self.config
    }

    /// Build the caller identity from both decoded tokens.
    ///
    /// Only a missing username is an error; absent roles fall back to
    /// `["user"]`.
    pub fn resolve(
        &self,
        access: &ClaimSet,
        identity: &ClaimSet,
    ) -> Result<IdentityRecord, ResolutionError> {
        let username = resolve_username(access, identity)?;
        let user_roles = self.resolve_roles(access, identity);
        let attributes = self.resolve_attributes(access, identity);

        Ok(IdentityRecord {
            username,
            user_roles,
            attributes,
        })
    }

    /// Identity served when authentication is disabled; no claims are read
    #[allow(clippy::unused_self)]
    pub fn resolve_with_auth_disabled(&self) -> IdentityRecord {
        IdentityRecord::static_identity()
    }

    fn resolve_roles(&self, access: &ClaimSet, identity: &ClaimSet) -> Vec<String> {
        let key = self.config.user_roles_claim.as_str();

        // Present-but-empty lists count as present
        if let Some(roles) = identity.get(key) {
            tracing::debug!(claim = key, "Roles resolved from id token");
            return roles.to_vec();
        }
        if let Some(roles) = access.get(key) {
            tracing::debug!(claim = key, "Roles resolved from access token");
            return roles.to_vec();
        }

        tracing::debug!(claim = key, "Role claim absent, using default role");
        vec![DEFAULT_ROLE.to_string()]
    }

    fn resolve_attributes(
        &self,
        access: &ClaimSet,
        identity: &ClaimSet,
    ) -> BTreeMap<String, ClaimValue> {
        let mut attributes = BTreeMap::new();

        for (name, value) in identity.iter().chain(access.iter()) {
            if self.is_reserved(name) {
                continue;
            }
            attributes
                .entry(name.clone())
                .or_insert_with(|| value.clone());
        }

        attributes
    }

    fn is_reserved(&self, name: &str) -> bool {
        name == USERNAME_CLAIM || name == self.config.user_roles_claim
    }
}

fn resolve_username(access: &ClaimSet, identity: &ClaimSet) -> Result<String, ResolutionError> {
    if let Some(name) = usable_username(identity) {
        tracing::debug!("Username resolved from id token");
        return Ok(name.to_string());
    }
    if let Some(name) = usable_username(access) {
        tracing::debug!("Username resolved from access token");
        return Ok(name.to_string());
    }

    tracing::warn!("No username present in access or id token");
    Err(ResolutionError::MissingUsername)
}

fn usable_username(claims: &ClaimSet) -> Option<&str> {
    claims
        .get(USERNAME_CLAIM)
        .and_then(ClaimValue::as_str)
        .filter(|name| !name.is_empty())
}
