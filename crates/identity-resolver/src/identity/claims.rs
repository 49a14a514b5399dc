//! Decoded token claims

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A claim is either a single string or an ordered list of strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClaimValue {
    One(String),
    Many(Vec<String>),
}

impl ClaimValue {
    /// Scalar value, `None` for lists
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::One(s) => Some(s),
            Self::Many(_) => None,
        }
    }

    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Self::One(s) => vec![s.clone()],
            Self::Many(v) => v.clone(),
        }
    }

    /// Normalize an arbitrary JSON claim into the closed string/list shape.
    ///
    /// Returns `None` for `null`, which is treated as an absent claim.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Array(items) => Some(Self::Many(
                items.into_iter().filter_map(scalar_text).collect(),
            )),
            other => scalar_text(other).map(Self::One),
        }
    }
}

impl From<&str> for ClaimValue {
    fn from(value: &str) -> Self {
        Self::One(value.to_string())
    }
}

impl From<String> for ClaimValue {
    fn from(value: String) -> Self {
        Self::One(value)
    }
}

impl From<Vec<String>> for ClaimValue {
    fn from(value: Vec<String>) -> Self {
        Self::Many(value)
    }
}

impl<const N: usize> From<[&str; N]> for ClaimValue {
    fn from(value: [&str; N]) -> Self {
        Self::Many(value.iter().map(|s| (*s).to_string()).collect())
    }
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        nested @ (Value::Array(_) | Value::Object(_)) => Some(nested.to_string()),
    }
}

/// Immutable mapping from claim name to value, as produced by a decoder.
///
/// Keys are kept ordered so that serialized attributes are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimSet {
    claims: BTreeMap<String, ClaimValue>,
}

impl ClaimSet {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            claims: BTreeMap::new(),
        }
    }

    /// Build from a decoded JWT payload, dropping `null` claims
    pub fn from_json_map(map: serde_json::Map<String, Value>) -> Self {
        map.into_iter()
            .filter_map(|(name, value)| ClaimValue::from_json(value).map(|v| (name, v)))
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&ClaimValue> {
        self.claims.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.claims.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ClaimValue)> {
        self.claims.iter()
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for ClaimSet
where
    K: Into<String>,
    V: Into<ClaimValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            claims: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ClaimSet {
    type Item = (&'a String, &'a ClaimValue);
    type IntoIter = std::collections::btree_map::Iter<'a, String, ClaimValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.claims.iter()
    }
}
