//! Token extraction from request cookies

use axum::http::{HeaderMap, header};
use cookie::Cookie;

use crate::constants::{ACCESS_TOKEN_COOKIE, ID_TOKEN_COOKIE};

/// Raw token strings carried by the request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenCookies {
    pub access_token: Option<String>,
    pub id_token: Option<String>,
}

impl TokenCookies {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            access_token: extract_cookie(headers, ACCESS_TOKEN_COOKIE),
            id_token: extract_cookie(headers, ID_TOKEN_COOKIE),
        }
    }
}

/// First non-empty value of cookie `name` across all `Cookie` headers
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse_encoded)
        .filter_map(Result::ok)
        .find(|c| c.name() == name && !c.value().is_empty())
        .map(|c| c.value().to_string())
}
