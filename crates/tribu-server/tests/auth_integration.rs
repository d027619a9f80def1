use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use tribu_core::config::Config;
use tribu_duckdb::DuckDbBackend;
use tribu_server::app::build_app;
use tribu_server::state::AppState;

/// Low argon2 memory for fast tests.
fn test_config() -> Config {
    Config {
        port: 0,
        data_dir: "/tmp/tribu-test".to_string(),
        secret_key: "test_secret".to_string(),
        https: false,
        session_days: 1,
        remember_days: 30,
        argon2_memory_kb: 4096,
        duckdb_memory_limit: "1GB".to_string(),
    }
}

/// Fresh in-memory backend + state + app.
fn setup() -> (Arc<AppState>, axum::Router) {
    let db = DuckDbBackend::open_in_memory().expect("in-memory DuckDB");
    let state = Arc::new(AppState::new(db, test_config()));
    let app = build_app(Arc::clone(&state));
    (state, app)
}

async fn json_body(response: axum::http::Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("parse JSON")
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("build request")
}

/// Registration body for "María Gómez" — given and family name submitted
/// unnormalized on purpose.
fn maria_registration() -> Value {
    json!({
        "given_name": "maría",
        "first_family_name": "gómez123",
        "phone": "12345678",
        "email": "a@x.com",
        "username": "maria",
        "password": "p1",
        "password_confirm": "p1"
    })
}

fn login_body(identifier: &str, password: &str, remember: bool) -> Value {
    json!({ "identifier": identifier, "password": password, "remember": remember })
}

/// Register María and log her in; returns the session cookie value.
async fn register_and_login(app: &axum::Router) -> String {
    let response = app
        .clone()
        .oneshot(post_json("/api/auth/register", maria_registration()))
        .await
        .expect("register request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(post_json("/api/auth/login", login_body("a@x.com", "p1", false)))
        .await
        .expect("login request");
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get("set-cookie")
        .expect("Set-Cookie header must be present")
        .to_str()
        .expect("valid header string")
        .to_string();
    set_cookie
        .split(';')
        .next()
        .expect("cookie value")
        .to_string()
}

#[tokio::test]
async fn register_normalizes_names_and_login_succeeds() {
    let (_state, app) = setup();

    let response = app
        .clone()
        .oneshot(post_json("/api/auth/register", maria_registration()))
        .await
        .expect("register");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["data"]["username"], "maria");

    // Login by email identifier.
    let response = app
        .clone()
        .oneshot(post_json("/api/auth/login", login_body("a@x.com", "p1", false)))
        .await
        .expect("login");
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    // Names were normalized before persisting.
    assert_eq!(body["data"]["full_name"], "María Gómez");
}

#[tokio::test]
async fn login_accepts_username_identifier() {
    let (_state, app) = setup();
    register_and_login(&app).await;

    let response = app
        .clone()
        .oneshot(post_json("/api/auth/login", login_body("maria", "p1", false)))
        .await
        .expect("login");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn duplicate_email_username_phone_conflict_per_field() {
    let (_state, app) = setup();
    let response = app
        .clone()
        .oneshot(post_json("/api/auth/register", maria_registration()))
        .await
        .expect("register");
    assert_eq!(response.status(), StatusCode::CREATED);

    // Same email, everything else distinct.
    let mut dup = maria_registration();
    dup["username"] = json!("otra");
    dup["phone"] = json!("87654321");
    let response = app
        .clone()
        .oneshot(post_json("/api/auth/register", dup))
        .await
        .expect("register dup email");
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "uniqueness_conflict");
    assert_eq!(body["error"]["field"], "email");

    // Same username.
    let mut dup = maria_registration();
    dup["email"] = json!("b@x.com");
    dup["phone"] = json!("87654321");
    let response = app
        .clone()
        .oneshot(post_json("/api/auth/register", dup))
        .await
        .expect("register dup username");
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(json_body(response).await["error"]["field"], "username");

    // Same phone.
    let mut dup = maria_registration();
    dup["email"] = json!("b@x.com");
    dup["username"] = json!("otra");
    let response = app
        .clone()
        .oneshot(post_json("/api/auth/register", dup))
        .await
        .expect("register dup phone");
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(json_body(response).await["error"]["field"], "phone");
}

#[tokio::test]
async fn register_collects_all_validation_errors() {
    let (_state, app) = setup();

    let mut bad = maria_registration();
    bad["phone"] = json!("1234567"); // 7 digits
    bad["password_confirm"] = json!("p2");
    let response = app
        .clone()
        .oneshot(post_json("/api/auth/register", bad))
        .await
        .expect("register");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "validation_error");
    let message = body["error"]["message"].as_str().expect("message");
    assert!(message.contains("exactly 8 digits"));
    assert!(message.contains("passwords do not match"));
}

#[tokio::test]
async fn login_failure_is_one_generic_message() {
    let (_state, app) = setup();
    register_and_login(&app).await;

    // Wrong password.
    let response = app
        .clone()
        .oneshot(post_json("/api/auth/login", login_body("a@x.com", "wrong", false)))
        .await
        .expect("login");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let wrong_pw = json_body(response).await;

    // Unknown identifier — byte-identical error body.
    let response = app
        .clone()
        .oneshot(post_json("/api/auth/login", login_body("nobody@x.com", "p1", false)))
        .await
        .expect("login");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let unknown_id = json_body(response).await;

    assert_eq!(wrong_pw, unknown_id);
}

#[tokio::test]
async fn remember_me_extends_cookie_lifetime() {
    let (_state, app) = setup();
    register_and_login(&app).await;

    let response = app
        .clone()
        .oneshot(post_json("/api/auth/login", login_body("maria", "p1", true)))
        .await
        .expect("login remembered");
    let set_cookie = response
        .headers()
        .get("set-cookie")
        .expect("Set-Cookie")
        .to_str()
        .expect("header string");
    // 30 days.
    assert!(set_cookie.contains("Max-Age=2592000"));

    let response = app
        .clone()
        .oneshot(post_json("/api/auth/login", login_body("maria", "p1", false)))
        .await
        .expect("login ordinary");
    let set_cookie = response
        .headers()
        .get("set-cookie")
        .expect("Set-Cookie")
        .to_str()
        .expect("header string");
    // Ordinary login: browser-session cookie, no Max-Age.
    assert!(!set_cookie.contains("Max-Age"));
}

#[tokio::test]
async fn session_endpoint_reflects_cookie() {
    let (_state, app) = setup();

    // Anonymous.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/auth/session")
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("session request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Authenticated.
    let cookie = register_and_login(&app).await;
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/auth/session")
                .header("cookie", &cookie)
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("session request");
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["authenticated"], true);
    assert_eq!(body["data"]["username"], "maria");
    assert_eq!(body["data"]["full_name"], "María Gómez");
}

#[tokio::test]
async fn logout_clears_the_cookie() {
    let (_state, app) = setup();
    register_and_login(&app).await;

    let response = app
        .clone()
        .oneshot(post_json("/api/auth/logout", json!({})))
        .await
        .expect("logout");
    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response
        .headers()
        .get("set-cookie")
        .expect("Set-Cookie")
        .to_str()
        .expect("header string");
    assert!(set_cookie.contains("tribu_session=;"));
    assert!(set_cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn seeded_admin_can_log_in() {
    let (state, app) = setup();
    state
        .db
        .seed_default_admin(state.config.argon2_memory_kb)
        .await
        .expect("seed admin");

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            login_body("admin@app.com", "password123", false),
        ))
        .await
        .expect("login");
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["username"], "admin");
    assert_eq!(body["data"]["full_name"], "Admin User");
}
