//! End-to-end tests through the real router.
//!
//! Each test builds the full application against a throwaway SQLite file and
//! drives it with `tower::ServiceExt::oneshot`, exactly as a client would
//! over HTTP.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use linkpress_backend::{
    app::{build_router, AppState},
    auth::TokenProvider,
    store::Db,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tower::ServiceExt;

// base64 of "integration-test-signing-secret-01234"
const SECRET: &str = "aW50ZWdyYXRpb24tdGVzdC1zaWduaW5nLXNlY3JldC0wMTIzNA==";

fn app() -> (Router, NamedTempFile) {
    let file = NamedTempFile::new().unwrap();
    let db = Db::open(file.path().to_str().unwrap()).unwrap();
    let tokens = Arc::new(TokenProvider::from_base64_secret(SECRET).unwrap());
    let router = build_router(AppState::new(db, tokens));
    (router, file)
}

fn post(uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn signup(router: &Router, login: &str, password: &str) {
    let resp = router
        .clone()
        .oneshot(post(
            "/api/v1/user/signup",
            json!({ "login": login, "password": password }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
}

/// Sign in and return (accessToken, refreshToken).
async fn signin(router: &Router, login: &str, password: &str) -> (String, String) {
    let resp = router
        .clone()
        .oneshot(post(
            "/api/v1/user/signin",
            json!({ "login": login, "password": password }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["message"], "Authentication successful");
    (
        body["accessToken"].as_str().unwrap().to_string(),
        body["refreshToken"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn test_signup_validation_and_conflict() {
    let (router, _db) = app();

    // Short username
    let resp = router
        .clone()
        .oneshot(post(
            "/api/v1/user/signup",
            json!({ "login": "abc", "password": "Passw0rd1" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Weak password
    let resp = router
        .clone()
        .oneshot(post(
            "/api/v1/user/signup",
            json!({ "login": "alice", "password": "password" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    signup(&router, "alice", "Passw0rd1").await;

    // Duplicate login
    let resp = router
        .clone()
        .oneshot(post(
            "/api/v1/user/signup",
            json!({ "login": "alice", "password": "Passw0rd1" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(resp).await["message"], "User already exists");
}

#[tokio::test]
async fn test_signin_failures() {
    let (router, _db) = app();
    signup(&router, "alice", "Passw0rd1").await;

    let resp = router
        .clone()
        .oneshot(post(
            "/api/v1/user/signin",
            json!({ "login": "nobody", "password": "Passw0rd1" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await["message"], "User not found");

    let resp = router
        .clone()
        .oneshot(post(
            "/api/v1/user/signin",
            json!({ "login": "alice", "password": "Wrong0pass" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await["message"], "Invalid password");
}

#[tokio::test]
async fn test_greeting_requires_token() {
    let (router, _db) = app();
    signup(&router, "alice", "Passw0rd1").await;
    let (access, _refresh) = signin(&router, "alice", "Passw0rd1").await;

    // No token
    let resp = router
        .clone()
        .oneshot(get("/api/v1/user/test", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Garbage token proceeds anonymous and is denied the same way
    let resp = router
        .clone()
        .oneshot(get("/api/v1/user/test", Some("not.a.token")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Valid token
    let resp = router
        .clone()
        .oneshot(get("/api/v1/user/test", Some(&access)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["message"], "Hello, alice");
    assert_eq!(body["role"], "USER");
}

#[tokio::test]
async fn test_role_tiers_enforced() {
    let (router, _db) = app();
    signup(&router, "alice", "Passw0rd1").await;
    let (user_access, _) = signin(&router, "alice", "Passw0rd1").await;

    // Plain user is forbidden on every elevated tier.
    for uri in [
        "/api/v1/moderator/test",
        "/api/v1/manager/test",
        "/api/v1/admin/test",
        "/api/v1/admin/blacklisted-tokens",
    ] {
        let resp = router
            .clone()
            .oneshot(get(uri, Some(&user_access)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN, "{uri}");
    }

    // An admin reaches all of them.
    let resp = router
        .clone()
        .oneshot(post(
            "/api/v1/user/register-admin",
            json!({ "login": "admin1", "password": "Adm1nPass" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let (admin_access, _) = signin(&router, "admin1", "Adm1nPass").await;

    for uri in [
        "/api/v1/moderator/test",
        "/api/v1/manager/test",
        "/api/v1/admin/test",
        "/api/v1/admin/blacklisted-tokens",
    ] {
        let resp = router
            .clone()
            .oneshot(get(uri, Some(&admin_access)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");
    }
}

#[tokio::test]
async fn test_refresh_rotation_and_reuse() {
    let (router, _db) = app();
    signup(&router, "alice", "Passw0rd1").await;
    let (_, refresh) = signin(&router, "alice", "Passw0rd1").await;

    // Claims carry second-resolution timestamps; step past the issuing
    // second so the rotated token cannot collide with the original.
    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

    // First refresh succeeds and hands out a new pair.
    let resp = router
        .clone()
        .oneshot(post(
            "/api/v1/user/refresh",
            json!({ "refreshToken": refresh }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    let rotated = body["refreshToken"].as_str().unwrap().to_string();
    assert_ne!(rotated, refresh);

    // Replaying the consumed token is rejected as logged out.
    let resp = router
        .clone()
        .oneshot(post(
            "/api/v1/user/refresh",
            json!({ "refreshToken": refresh }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(resp).await["message"],
        "This token is no longer active (logged out)"
    );

    // The rotated token still works.
    let resp = router
        .clone()
        .oneshot(post(
            "/api/v1/user/refresh",
            json!({ "refreshToken": rotated }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // A token signed by nobody we know is invalid, not logged out.
    let resp = router
        .clone()
        .oneshot(post(
            "/api/v1/user/refresh",
            json!({ "refreshToken": "not.a.token" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(resp).await["message"],
        "This token is no longer valid (invalid or expired)"
    );
}

#[tokio::test]
async fn test_logout_blacklists_refresh_token() {
    let (router, _db) = app();
    signup(&router, "alice", "Passw0rd1").await;
    let (access, refresh) = signin(&router, "alice", "Passw0rd1").await;

    // Missing token is a 400.
    let resp = router
        .clone()
        .oneshot(post("/api/v1/user/logout", json!({}), None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["message"], "Refresh token is missing");

    let resp = router
        .clone()
        .oneshot(post(
            "/api/v1/user/logout",
            json!({ "refreshToken": refresh }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await["message"],
        "Logout successful. Token blacklisted."
    );

    // The refresh token is dead.
    let resp = router
        .clone()
        .oneshot(post(
            "/api/v1/user/refresh",
            json!({ "refreshToken": refresh }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // The access token keeps working until it expires on its own.
    let resp = router
        .clone()
        .oneshot(get("/api/v1/user/test", Some(&access)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_link_lifecycle_and_ownership() {
    let (router, _db) = app();
    signup(&router, "alice", "Passw0rd1").await;
    signup(&router, "bobby", "Passw0rd1").await;
    let (alice, _) = signin(&router, "alice", "Passw0rd1").await;
    let (bobby, _) = signin(&router, "bobby", "Passw0rd1").await;

    // Invalid URL is rejected.
    let resp = router
        .clone()
        .oneshot(post(
            "/api/v1/link/shorten",
            json!({ "originalUrl": "example.com" }),
            Some(&alice),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Create a link as alice.
    let resp = router
        .clone()
        .oneshot(post(
            "/api/v1/link/shorten",
            json!({ "originalUrl": "https://example.com/page" }),
            Some(&alice),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    let short = body["shortLink"].as_str().unwrap().to_string();

    // Expand it twice; clicks accumulate.
    for _ in 0..2 {
        let resp = router
            .clone()
            .oneshot(post(
                "/api/v1/link/expand",
                json!({ "originalUrl": short }),
                Some(&alice),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            body_json(resp).await["fullUrl"],
            "https://example.com/page"
        );
    }

    let resp = router
        .clone()
        .oneshot(post(
            "/api/v1/statistics/clicks",
            json!({ "originalUrl": short }),
            Some(&alice),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["totalClicks"], 2);

    // Bobby cannot touch alice's link.
    let resp = router
        .clone()
        .oneshot(post(
            "/api/v1/link/expand",
            json!({ "originalUrl": short }),
            Some(&bobby),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Unknown short link is a 404.
    let resp = router
        .clone()
        .oneshot(post(
            "/api/v1/link/expand",
            json!({ "originalUrl": "https://zzzzzz" }),
            Some(&alice),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_note_ownership() {
    let (router, _db) = app();
    signup(&router, "alice", "Passw0rd1").await;
    signup(&router, "bobby", "Passw0rd1").await;
    let (alice, _) = signin(&router, "alice", "Passw0rd1").await;
    let (bobby, _) = signin(&router, "bobby", "Passw0rd1").await;

    let resp = router
        .clone()
        .oneshot(post(
            "/api/v1/notes",
            json!({ "title": "groceries", "content": "milk" }),
            Some(&alice),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let id = body_json(resp).await["data"]["id"].as_i64().unwrap();

    // Owner reads it back.
    let resp = router
        .clone()
        .oneshot(get(&format!("/api/v1/notes/{id}"), Some(&alice)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // Foreign user is forbidden, unknown id is a 404.
    let resp = router
        .clone()
        .oneshot(get(&format!("/api/v1/notes/{id}"), Some(&bobby)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = router
        .clone()
        .oneshot(get("/api/v1/notes/999999", Some(&alice)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_statistics_views() {
    let (router, _db) = app();
    signup(&router, "alice", "Passw0rd1").await;
    let (alice, _) = signin(&router, "alice", "Passw0rd1").await;

    // No links yet: 404.
    let resp = router
        .clone()
        .oneshot(get("/api/v1/statistics/all", Some(&alice)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["message"], "No URLs found");

    let resp = router
        .clone()
        .oneshot(post(
            "/api/v1/link/shorten",
            json!({ "originalUrl": "https://example.com/one" }),
            Some(&alice),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = router
        .clone()
        .oneshot(get("/api/v1/statistics/all", Some(&alice)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["totalClicks"], 0);
    assert_eq!(body["urlList"].as_array().unwrap().len(), 1);
    assert_eq!(body["urlList"][0]["isActive"], true);

    let resp = router
        .clone()
        .oneshot(get("/api/v1/statistics/active", Some(&alice)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_v2_placeholder_and_unknown_paths() {
    let (router, _db) = app();
    signup(&router, "alice", "Passw0rd1").await;
    let (alice, _) = signin(&router, "alice", "Passw0rd1").await;

    // v2 is gated like everything else.
    let resp = router
        .clone()
        .oneshot(get("/api/v2/anything", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = router
        .clone()
        .oneshot(get("/api/v2/anything", Some(&alice)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await["message"],
        "Version 2 is currently under development."
    );

    // An unknown authenticated path is a plain 404.
    let resp = router
        .clone()
        .oneshot(get("/some/other/path", Some(&alice)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_is_public() {
    let (router, _db) = app();
    let resp = router.clone().oneshot(get("/health", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
