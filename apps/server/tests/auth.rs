use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rand::{rngs::OsRng, RngCore};
use serde_json::{json, Value};
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;

use finboard_server::{api::app_router, build_state, config::Config};

async fn build_test_router() -> (Router, TempDir) {
    let tmp = tempdir().unwrap();
    let db_path = tmp.path().join("test.db").to_string_lossy().to_string();

    let mut secret_bytes = [0u8; 32];
    OsRng.fill_bytes(&mut secret_bytes);
    let secret_b64 = BASE64.encode(secret_bytes);

    let config = Config::from_lookup(|key| match key {
        "FB_DB_PATH" => Some(db_path.clone()),
        "FB_SECRET_KEY" => Some(secret_b64.clone()),
        "FB_FMP_BASE_URL" => Some("http://127.0.0.1:9".to_string()),
        _ => None,
    })
    .unwrap();
    let state = build_state(&config).await.unwrap();
    (app_router(state, &config), tmp)
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn register(app: &Router, email: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/auth/register",
            None,
            json!({ "email": email, "password": "correct-horse", "displayName": "Ada" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let session = body_json(response).await;
    assert_eq!(session["tokenType"], "Bearer");
    session["accessToken"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_routes_are_public() {
    let (app, _tmp) = build_test_router().await;

    let response = app.clone().oneshot(get("/api/v1/healthz", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let response = app.oneshot(get("/api/v1/readyz", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn data_routes_require_a_token() {
    let (app, _tmp) = build_test_router().await;

    let response = app.clone().oneshot(get("/api/v1/portfolios", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(get("/api/v1/portfolios", Some("not-a-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["code"], 401);
}

#[tokio::test]
async fn register_create_portfolio_and_sign_out() {
    let (app, _tmp) = build_test_router().await;
    let token = register(&app, "Ada@Example.com").await;

    let response = app.clone().oneshot(get("/api/v1/auth/me", Some(&token))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["email"], "ada@example.com");

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/portfolios",
            Some(&token),
            json!({ "name": "Retirement" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let portfolio = body_json(response).await;
    let portfolio_id = portfolio["id"].as_str().unwrap().to_string();

    let response = app.clone().oneshot(get("/api/v1/portfolios", Some(&token))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let list = body_json(response).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["name"], "Retirement");

    // Empty portfolio values without touching market data
    let response = app
        .clone()
        .oneshot(get(
            &format!("/api/v1/portfolios/{}/metrics", portfolio_id),
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request(Method::POST, "/api/v1/auth/sign-out", Some(&token), json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.oneshot(get("/api/v1/portfolios", Some(&token))).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let (app, _tmp) = build_test_router().await;
    register(&app, "dup@example.com").await;

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/v1/auth/register",
            None,
            json!({ "email": "DUP@example.com", "password": "another-pass" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn sign_in_with_wrong_password_is_rejected() {
    let (app, _tmp) = build_test_router().await;
    register(&app, "eve@example.com").await;

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/auth/sign-in",
            None,
            json!({ "email": "eve@example.com", "password": "wrong-password" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/v1/auth/sign-in",
            None,
            json!({ "email": "eve@example.com", "password": "correct-horse" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn portfolios_are_private_to_their_owner() {
    let (app, _tmp) = build_test_router().await;
    let alice = register(&app, "alice@example.com").await;
    let bob = register(&app, "bob@example.com").await;

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/portfolios",
            Some(&alice),
            json!({ "name": "Alice only" }),
        ))
        .await
        .unwrap();
    let portfolio_id = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(get(&format!("/api/v1/portfolios/{}", portfolio_id), Some(&bob)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(get("/api/v1/portfolios/does-not-exist", Some(&bob)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn watchlist_limits_map_to_conflict() {
    let (app, _tmp) = build_test_router().await;
    let token = register(&app, "watcher@example.com").await;

    for i in 0..10 {
        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/v1/watchlists",
                Some(&token),
                json!({ "name": format!("List {}", i) }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/v1/watchlists",
            Some(&token),
            json!({ "name": "Eleventh" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}
