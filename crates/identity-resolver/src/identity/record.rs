//! Resolved identity record

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::claims::ClaimValue;
use crate::constants::{STATIC_EMAIL, STATIC_ROLES, STATIC_USERNAME};

/// Normalized identity of the caller, serialized as the response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub username: String,
    pub user_roles: Vec<String>,
    pub attributes: BTreeMap<String, ClaimValue>,
}

impl IdentityRecord {
    /// Fixed identity served while authentication is disabled
    pub fn static_identity() -> Self {
        Self {
            username: STATIC_USERNAME.to_string(),
            user_roles: STATIC_ROLES.iter().map(|r| (*r).to_string()).collect(),
            attributes: BTreeMap::from([(
                "email".to_string(),
                ClaimValue::One(STATIC_EMAIL.to_string()),
            )]),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(ClaimValue::as_str)
    }
}
