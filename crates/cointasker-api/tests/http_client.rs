//! Integration tests for the HTTP clients against a real (mock) backend.
//!
//! These exercise the wire-visible contract: token attachment iff an
//! identity is present at send time, the single forced logout on
//! 401/403, and pass-through of everything else.

use cointasker_api::{ApiClient, ApiConfig, ApiError, PublicClient};
use cointasker_session::{InMemoryProvider, SessionStore};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EMAIL: &str = "worker@example.com";
const PASSWORD: &str = "hunter2";

/// An authenticated client pointed at the mock server, with a session
/// store that already knows one account.
async fn client_against(
    server: &MockServer,
) -> (
    ApiClient<InMemoryProvider>,
    std::sync::Arc<SessionStore<InMemoryProvider>>,
) {
    let provider = InMemoryProvider::new();
    provider.seed_account(EMAIL, PASSWORD, Some("Worker"));
    let session = SessionStore::new(provider);
    let config = ApiConfig::new(&server.uri(), &server.uri()).unwrap();
    let client = ApiClient::new(&config, std::sync::Arc::clone(&session));
    (client, session)
}

/// The Authorization header of the only received request, if any.
async fn sole_request_auth_header(server: &MockServer) -> Option<String> {
    let requests = server
        .received_requests()
        .await
        .expect("request recording enabled");
    assert_eq!(requests.len(), 1, "expected exactly one request");
    requests[0]
        .headers
        .get("authorization")
        .map(|v| v.to_str().expect("header is ascii").to_string())
}

// =========================================================================
// Token attachment
// =========================================================================

#[tokio::test]
async fn test_get_signed_in_attaches_fresh_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let (client, session) = client_against(&server).await;
    session.login_with_password(EMAIL, PASSWORD).await.unwrap();

    let _: serde_json::Value = client.get("tasks").await.unwrap();

    let auth = sole_request_auth_header(&server)
        .await
        .expect("authenticated request must carry a header");
    let token = auth.strip_prefix("Bearer ").expect("bearer scheme");
    assert_eq!(token.len(), 32, "provider mints 32-hex-char tokens");
}

#[tokio::test]
async fn test_get_signed_out_sends_no_authorization_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let (client, _session) = client_against(&server).await;
    // Nobody ever signed in.

    let _: serde_json::Value = client.get("tasks").await.unwrap();

    assert!(
        sole_request_auth_header(&server).await.is_none(),
        "absent identity means absent header"
    );
}

#[tokio::test]
async fn test_each_request_mints_its_own_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let (client, session) = client_against(&server).await;
    session.login_with_password(EMAIL, PASSWORD).await.unwrap();

    let _: serde_json::Value = client.get("tasks").await.unwrap();
    let _: serde_json::Value = client.get("tasks").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let tokens: Vec<_> = requests
        .iter()
        .map(|r| r.headers.get("authorization").unwrap().clone())
        .collect();
    assert_ne!(tokens[0], tokens[1], "tokens are minted per request");
}

// =========================================================================
// Session-expiry policy
// =========================================================================

#[tokio::test]
async fn test_forbidden_forces_logout_and_surfaces_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/submissions"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let (client, session) = client_against(&server).await;
    session.login_with_password(EMAIL, PASSWORD).await.unwrap();

    let result: Result<serde_json::Value, _> =
        client.get("submissions").await;

    // The caller still sees the rejection…
    assert!(matches!(
        result,
        Err(ApiError::Unauthorized { status: 403 })
    ));
    // …and the session has been forced to the known-good logged-out
    // state by the time the error is observable.
    assert!(session.snapshot().identity.is_none());
}

#[tokio::test]
async fn test_unauthorized_401_triggers_same_policy() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/submissions"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let (client, session) = client_against(&server).await;
    session.login_with_password(EMAIL, PASSWORD).await.unwrap();

    let result: Result<serde_json::Value, _> =
        client.get("submissions").await;

    assert!(matches!(
        result,
        Err(ApiError::Unauthorized { status: 401 })
    ));
    assert!(session.snapshot().identity.is_none());
}

#[tokio::test]
async fn test_forced_logout_reaches_signed_out_despite_provider_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/submissions"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let provider = InMemoryProvider::new();
    provider.seed_account(EMAIL, PASSWORD, None);
    let session = SessionStore::new(provider.clone());
    let config = ApiConfig::new(&server.uri(), &server.uri()).unwrap();
    let client = ApiClient::new(&config, std::sync::Arc::clone(&session));
    session.login_with_password(EMAIL, PASSWORD).await.unwrap();
    // The provider goes dark before the backend revokes authorization.
    provider.fail_sign_out("connection reset");

    let result: Result<serde_json::Value, _> =
        client.get("submissions").await;

    assert!(matches!(
        result,
        Err(ApiError::Unauthorized { status: 403 })
    ));
    // The local session still reaches the logged-out state, so guards
    // stop allowing the authenticated subtrees.
    assert!(session.snapshot().identity.is_none());
}

#[tokio::test]
async fn test_request_after_forced_logout_is_bare() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/submissions"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let (client, session) = client_against(&server).await;
    session.login_with_password(EMAIL, PASSWORD).await.unwrap();

    let _: Result<serde_json::Value, _> = client.get("submissions").await;
    // The logout completed before the error surfaced, so this request
    // reads an absent identity: no stale token can be attached.
    let _: serde_json::Value = client.get("tasks").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let follow_up = requests
        .iter()
        .find(|r| r.url.path() == "/tasks")
        .expect("follow-up request");
    assert!(
        follow_up.headers.get("authorization").is_none(),
        "no token may be minted from the pre-logout identity"
    );
}

// =========================================================================
// Pass-through of everything else
// =========================================================================

#[tokio::test]
async fn test_server_error_passes_through_with_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(
            ResponseTemplate::new(500).set_body_string("boom"),
        )
        .mount(&server)
        .await;

    let (client, session) = client_against(&server).await;
    session.login_with_password(EMAIL, PASSWORD).await.unwrap();

    let result: Result<serde_json::Value, _> = client.get("tasks").await;

    match result {
        Err(ApiError::Status { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "boom");
        }
        other => panic!("expected Status error, got {other:?}"),
    }
    // A 500 is not a session problem.
    assert!(session.snapshot().identity.is_some());
}

#[tokio::test]
async fn test_malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("not json"),
        )
        .mount(&server)
        .await;

    let (client, _session) = client_against(&server).await;

    let result: Result<serde_json::Value, _> = client.get("tasks").await;

    assert!(matches!(result, Err(ApiError::Decode(_))));
}

#[tokio::test]
async fn test_unreachable_backend_is_a_network_error() {
    // Port 9 (discard) refuses connections on any sane machine.
    let config =
        ApiConfig::new("http://127.0.0.1:9", "http://127.0.0.1:9").unwrap();
    let session = SessionStore::new(InMemoryProvider::new());
    let client = ApiClient::new(&config, session);

    let result: Result<serde_json::Value, _> = client.get("tasks").await;

    assert!(matches!(result, Err(ApiError::Network(_))));
}

// =========================================================================
// Typed endpoint helpers
// =========================================================================

#[tokio::test]
async fn test_get_user_decodes_profile_with_role() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/worker@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Worker",
            "email": EMAIL,
            "role": "worker",
            "coin": 10
        })))
        .mount(&server)
        .await;

    let (client, session) = client_against(&server).await;
    session.login_with_password(EMAIL, PASSWORD).await.unwrap();

    let profile = client.get_user(EMAIL).await.unwrap();

    assert_eq!(profile.role, cointasker_types::Role::Worker);
    assert_eq!(profile.coin, 10);
}

#[tokio::test]
async fn test_get_coin_decodes_balance() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/worker@example.com/coin"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "coin": 140 })),
        )
        .mount(&server)
        .await;

    let (client, session) = client_against(&server).await;
    session.login_with_password(EMAIL, PASSWORD).await.unwrap();

    let balance = client.get_coin(EMAIL).await.unwrap();

    assert_eq!(balance.coin, 140);
}

#[tokio::test]
async fn test_post_sends_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users"))
        .and(body_json(json!({ "email": EMAIL, "role": "worker" })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "inserted": true })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (client, _session) = client_against(&server).await;

    let reply: serde_json::Value = client
        .post("users", &json!({ "email": EMAIL, "role": "worker" }))
        .await
        .unwrap();

    assert_eq!(reply["inserted"], true);
}

// =========================================================================
// PublicClient
// =========================================================================

#[tokio::test]
async fn test_public_client_never_attaches_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks/open"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    // Even with a signed-in session elsewhere in the app, the public
    // client knows nothing about it.
    let (_, session) = client_against(&server).await;
    session.login_with_password(EMAIL, PASSWORD).await.unwrap();

    let config = ApiConfig::new(&server.uri(), &server.uri()).unwrap();
    let public = PublicClient::new(&config);
    let _: serde_json::Value = public.get("tasks/open").await.unwrap();

    assert!(sole_request_auth_header(&server).await.is_none());
}

#[tokio::test]
async fn test_public_client_401_does_not_force_logout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks/open"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let (_, session) = client_against(&server).await;
    session.login_with_password(EMAIL, PASSWORD).await.unwrap();

    let config = ApiConfig::new(&server.uri(), &server.uri()).unwrap();
    let public = PublicClient::new(&config);
    let result: Result<serde_json::Value, _> =
        public.get("tasks/open").await;

    // Plain status error, and the session is untouched.
    assert!(matches!(
        result,
        Err(ApiError::Status { status: 401, .. })
    ));
    assert!(session.snapshot().identity.is_some());
}
