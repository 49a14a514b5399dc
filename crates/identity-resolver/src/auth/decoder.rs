//! Claims decoder seam
//!
//! The identity service only needs one capability from token handling:
//! turn a raw token into a claim set, or fail. Implementations must fail
//! rather than return an empty set for a token they cannot trust.

use async_trait::async_trait;

use super::error::Result;
use crate::identity::ClaimSet;

#[async_trait]
pub trait ClaimsDecoder: Send + Sync {
    async fn decode(&self, token: &str) -> Result<ClaimSet>;
}
