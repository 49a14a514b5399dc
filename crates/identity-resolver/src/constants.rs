//! Constants for the identity resolver

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

/// Claim carrying the username in both tokens
pub const USERNAME_CLAIM: &str = "username";

/// Role assigned when neither token carries the role claim
pub const DEFAULT_ROLE: &str = "user";

/// Role claim used when none is configured (Cognito user pool groups)
pub const DEFAULT_USER_ROLES_CLAIM: &str = "cognito:groups";

/// Message returned when no username can be resolved
pub const MISSING_USERNAME_MESSAGE: &str = "No username present in access or id token.";

/// Message returned when tokens cannot be checked on the server side
pub const TOKEN_VERIFICATION_UNAVAILABLE_MESSAGE: &str =
    "Unable to verify tokens at this time.";

/// Cookie holding the access token
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";

/// Cookie holding the identity token
pub const ID_TOKEN_COOKIE: &str = "idToken";

/// Static identity returned while authentication is disabled
pub const STATIC_USERNAME: &str = "username";
pub const STATIC_ROLES: [&str; 2] = ["user", "admin"];
pub const STATIC_EMAIL: &str = "user@domain.com";

/// HTTP listener defaults
pub const DEFAULT_HTTP_HOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
pub const DEFAULT_HTTP_PORT: u16 = 8080;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// CORS origin allowed when none is configured
#[cfg(feature = "http")]
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

/// Health status: success
#[cfg(feature = "http")]
pub const STATUS_OK: &str = "ok";
