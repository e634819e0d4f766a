//! End-to-end walkthrough of the CoinTasker client layer.
//!
//! Spins up a mock backend and the in-memory identity provider, then
//! drives the whole flow a real frontend would: sign-up with a profile,
//! route guards before and after login, role resolution, coin balance,
//! and finally a session expiry forced by the backend.
//!
//! Run with `RUST_LOG=debug cargo run -p login-flow` to watch the
//! session lifecycle in the logs.

use cointasker::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EMAIL: &str = "demo-worker@example.com";
const PASSWORD: &str = "correct horse battery staple";

#[tokio::main]
async fn main() {
    cointasker::init_tracing();

    let server = mock_backend().await;
    let config = ApiConfig::new(&server.uri(), &server.uri())
        .expect("mock server URI is a valid base");
    let app = CoinTaskerBuilder::new()
        .config(config)
        .build(InMemoryProvider::new());

    // Nobody is signed in yet: the protected route bounces to /login
    // and remembers where we were headed.
    let outcome = app
        .check_route(RouteGuard::AuthenticatedOnly, "/tasks/42")
        .await;
    println!("anonymous visit to /tasks/42  -> {outcome:?}");

    // Sign up as a worker. This creates the provider account, signs the
    // session in, and creates the backend profile with the worker's
    // 10-coin starting grant.
    let identity = app
        .register_with_profile(EMAIL, PASSWORD, "Demo Worker", Role::Worker)
        .await
        .expect("sign-up against the in-memory provider");
    println!("signed up as {} (uid {})", identity.email, identity.uid);

    // The three guards, now that we are authenticated.
    let protected = app
        .check_route(RouteGuard::AuthenticatedOnly, "/tasks/42")
        .await;
    let login_page =
        app.check_route(RouteGuard::AnonymousOnly, "/login").await;
    let worker_area = app
        .check_route(RouteGuard::RoleRestricted(Role::Worker), "/worker")
        .await;
    let admin_area = app
        .check_route(RouteGuard::RoleRestricted(Role::Admin), "/admin")
        .await;
    println!("authenticated /tasks/42      -> {protected:?}");
    println!("authenticated /login         -> {login_page:?}");
    println!("worker area as worker        -> {worker_area:?}");
    println!("admin area as worker         -> {admin_area:?}");

    // Role and balance, fetched through the authenticated client.
    let resolution = app.resolve_role().await.expect("signed in");
    let balance = app
        .my_coin()
        .await
        .expect("balance endpoint is mocked")
        .expect("signed in");
    println!(
        "role {resolution:?}, balance {} coins (${:.2})",
        balance.coin,
        coin_value_usd(balance.coin)
    );

    // The backend rejects the next call: the client treats that as an
    // expired session, signs out, and surfaces Unauthorized. Every
    // consumer watching the session sees the identity vanish.
    let expired: Result<serde_json::Value, ApiError> =
        app.api().get("withdrawals").await;
    println!("withdrawals after expiry     -> {expired:?}");
    println!(
        "signed in after forced logout: {}",
        app.snapshot().is_authenticated()
    );

    let outcome = app
        .check_route(RouteGuard::AuthenticatedOnly, "/tasks/42")
        .await;
    println!("visit to /tasks/42 once more -> {outcome:?}");
}

/// A backend just real enough for the walkthrough: profile creation,
/// the demo user's profile and balance, and a withdrawals endpoint
/// that always plays the session-expired card.
async fn mock_backend() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "inserted": true })),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/users/{EMAIL}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Demo Worker",
            "email": EMAIL,
            "role": "worker",
            "coin": 10
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/users/{EMAIL}/coin")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "coin": 10 })),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/withdrawals"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    server
}
