//! End-to-end tests of the get-identity endpoint with a canned decoder.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use identity_resolver::auth::{self, AuthError};
use identity_resolver::transport::router;
use identity_resolver::{
    ClaimSet, ClaimValue, ClaimsDecoder, IdentityConfig, IdentityService,
    TOKEN_VERIFICATION_UNAVAILABLE_MESSAGE, TransportConfig,
};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tower::ServiceExt;

const ROLES_CLAIM: &str = "user_roles_claim";
const BOTH_COOKIES: &str = "accessToken=access-token; idToken=identity-token";

/// Hands out canned claim sets in call order, like a patched `decode`
#[derive(Debug, Default)]
struct SequenceDecoder {
    responses: Mutex<VecDeque<auth::Result<ClaimSet>>>,
    calls: AtomicUsize,
}

impl SequenceDecoder {
    fn new(responses: Vec<auth::Result<ClaimSet>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClaimsDecoder for SequenceDecoder {
    async fn decode(&self, _token: &str) -> auth::Result<ClaimSet> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .pop_front()
            .unwrap_or(Err(AuthError::InvalidToken))
    }
}

fn claims(entries: &[(&str, ClaimValue)]) -> ClaimSet {
    entries.iter().map(|(k, v)| (*k, v.clone())).collect()
}

async fn get_identity(
    decoder: Arc<SequenceDecoder>,
    auth_enabled: bool,
    cookie: Option<&str>,
) -> (StatusCode, Value) {
    let config = IdentityConfig::new(ROLES_CLAIM).with_auth_enabled(auth_enabled);
    let app = router(
        IdentityService::new(config, decoder),
        &TransportConfig::default(),
    );

    let mut request = Request::builder().uri("/get-identity").method("GET");
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }

    let response = app
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn access_claims() -> ClaimSet {
    claims(&[
        (ROLES_CLAIM, ClaimValue::from(["access-token-group"])),
        ("username", ClaimValue::from("access-token-username")),
        ("email", ClaimValue::from("access-token-email")),
    ])
}

#[tokio::test]
async fn auth_disabled_returns_static_identity() {
    let decoder = SequenceDecoder::new(vec![]);

    let (status, body) = get_identity(decoder.clone(), false, Some(BOTH_COOKIES)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "user_roles": ["user", "admin"],
            "username": "username",
            "attributes": {"email": "user@domain.com"}
        })
    );
    assert_eq!(decoder.calls(), 0);
}

#[tokio::test]
async fn both_tokens_provide_attributes() {
    let identity = claims(&[
        (ROLES_CLAIM, ClaimValue::from(["id-token-group"])),
        ("username", ClaimValue::from("id-token-username")),
        ("email", ClaimValue::from("id-token-email")),
    ]);
    let decoder = SequenceDecoder::new(vec![Ok(access_claims()), Ok(identity)]);

    let (status, body) = get_identity(decoder, true, Some(BOTH_COOKIES)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "attributes": {"email": "id-token-email"},
            "user_roles": ["id-token-group"],
            "username": "id-token-username"
        })
    );
}

#[tokio::test]
async fn access_token_used_as_fallback() {
    let identity = claims(&[("email", ClaimValue::from("id-token-email"))]);
    let decoder = SequenceDecoder::new(vec![Ok(access_claims()), Ok(identity)]);

    let (status, body) = get_identity(decoder, true, Some(BOTH_COOKIES)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "attributes": {"email": "id-token-email"},
            "user_roles": ["access-token-group"],
            "username": "access-token-username"
        })
    );
}

#[tokio::test]
async fn no_username_provided_is_bad_request() {
    let identity = claims(&[
        ("user_roles", ClaimValue::from(["id-token-group"])),
        ("email", ClaimValue::from("id-token-email")),
    ]);
    let decoder = SequenceDecoder::new(vec![Ok(ClaimSet::new()), Ok(identity)]);

    let (status, body) = get_identity(decoder, true, Some(BOTH_COOKIES)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"message": "No username present in access or id token."})
    );
}

#[tokio::test]
async fn no_user_roles_provided_defaults_to_user() {
    let identity = claims(&[
        ("username", ClaimValue::from("id-token-username")),
        ("email", ClaimValue::from("id-token-email")),
    ]);
    let decoder = SequenceDecoder::new(vec![Ok(ClaimSet::new()), Ok(identity)]);

    let (status, body) = get_identity(decoder, true, Some(BOTH_COOKIES)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "attributes": {"email": "id-token-email"},
            "user_roles": ["user"],
            "username": "id-token-username"
        })
    );
}

#[tokio::test]
async fn missing_cookies_without_decoding() {
    let decoder = SequenceDecoder::new(vec![]);

    let (status, body) = get_identity(decoder.clone(), true, None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No username present in access or id token.");
    assert_eq!(decoder.calls(), 0);
}

#[tokio::test]
async fn only_id_token_cookie() {
    let identity = claims(&[("username", ClaimValue::from("alice"))]);
    let decoder = SequenceDecoder::new(vec![Ok(identity)]);

    let (status, body) = get_identity(decoder.clone(), true, Some("idToken=identity-token")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    assert_eq!(decoder.calls(), 1);
}

#[tokio::test]
async fn decode_failure_is_unauthorized() {
    let decoder = SequenceDecoder::new(vec![Err(AuthError::TokenExpired)]);

    let (status, body) = get_identity(decoder.clone(), true, Some(BOTH_COOKIES)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"message": "Invalid access token."}));
    assert_eq!(decoder.calls(), 1);
}

#[tokio::test]
async fn key_set_outage_is_service_unavailable() {
    let decoder = SequenceDecoder::new(vec![Err(AuthError::JwksFetch(
        "connection refused".to_string(),
    ))]);

    let (status, body) = get_identity(decoder.clone(), true, Some(BOTH_COOKIES)).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        body,
        json!({"message": TOKEN_VERIFICATION_UNAVAILABLE_MESSAGE})
    );
    assert_eq!(decoder.calls(), 1);
}

#[tokio::test]
async fn missing_decoder_secret_is_internal_error() {
    let identity = claims(&[("username", ClaimValue::from("alice"))]);
    let decoder = SequenceDecoder::new(vec![
        Ok(identity),
        Err(AuthError::Config("no HS secret configured".to_string())),
    ]);

    let (status, body) = get_identity(decoder, true, Some(BOTH_COOKIES)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], TOKEN_VERIFICATION_UNAVAILABLE_MESSAGE);
}

#[tokio::test]
async fn health_endpoint() {
    let config = IdentityConfig::new(ROLES_CLAIM).with_auth_enabled(false);
    let app = router(
        IdentityService::new(config, SequenceDecoder::new(vec![])),
        &TransportConfig::default(),
    );

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["auth_enabled"], false);
}
