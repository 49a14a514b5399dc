//! Identity resolution
//!
//! Merges the claims of an access token and an id token into a single
//! [`IdentityRecord`]. The id token is authoritative; the access token only
//! fills fields the id token lacks.

mod claims;
mod config;
mod error;
mod record;
mod resolver;
mod service;

pub use claims::{ClaimSet, ClaimValue};
pub use config::IdentityConfig;
pub use error::{ErrorBody, IdentityError, ResolutionError, TokenKind};
pub use record::IdentityRecord;
pub use resolver::IdentityResolver;
pub use service::IdentityService;
