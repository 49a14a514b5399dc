//! HTTP transport layer

mod cookies;
mod http;

pub use cookies::{TokenCookies, extract_cookie};
pub use http::{router, run_http};
