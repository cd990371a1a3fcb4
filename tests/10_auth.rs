mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client.get(format!("{}/health", server.base_url)).send().await?;
    assert_eq!(res.status(), StatusCode::OK, "unexpected status: {}", res.status());

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn server_binary_serves_authenticated_requests() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::dev_token(Uuid::new_v4());

    let res = client
        .post(format!("{}/products", server.base_url))
        .bearer_auth(&token)
        .json(&common::product("Widget", 9.99, 3, "Tools"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .post(format!("{}/products/get-by-filter", server.base_url))
        .bearer_auth(&token)
        .json(&json!({}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["totalCount"], 1);
    Ok(())
}

#[tokio::test]
async fn product_routes_require_a_token() {
    let app = common::TestApp::new();

    let (status, body) = app.post("/products/get-by-filter", None, json!({})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = app.get("/products/stats", Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.post("/upload/products/validate", None, json!({"products": []})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn public_routes_need_no_token() {
    let app = common::TestApp::new();

    let (status, body) = app.get("/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn cookie_token_is_accepted() {
    use axum::http::{header, Method};

    let app = common::TestApp::new();
    let user = common::TestUser::new();

    let request = axum::http::Request::builder()
        .method(Method::GET)
        .uri("/products/stats")
        .header(header::COOKIE, format!("Authorization={}", user.token))
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.raw(request).await;
    assert_eq!(response.status().as_u16(), 200);
}
