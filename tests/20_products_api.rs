mod common;

use common::{product, TestApp, TestUser};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn create_get_update_delete_round_trip() {
    let app = TestApp::new();
    let user = TestUser::new();

    let (status, body) = app.post("/products", user.auth(), product("  Widget ", 9.99, 3, "Tools")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "created");
    assert_eq!(body["data"]["name"], "Widget");
    assert_eq!(body["data"]["stockVisible"], true);
    assert_eq!(body["data"]["userId"], user.id.to_string());
    let id = body["data"]["_id"].as_str().unwrap().to_string();

    let (status, body) = app.get(&format!("/products/{}", id), user.auth()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "findOne");
    assert_eq!(body["data"]["_id"], id);

    let (status, body) = app.put(&format!("/products/{}", id), user.auth(), json!({"stock": 0})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "updated");
    assert_eq!(body["data"]["stock"], 0);
    assert_eq!(body["data"]["price"], 9.99);

    let (status, body) = app.delete(&format!("/products/{}", id), user.auth()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "deleted");

    let (status, body) = app.get(&format!("/products/{}", id), user.auth()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Product doesn't exist");
}

#[tokio::test]
async fn other_users_cannot_see_or_touch_a_product() {
    let app = TestApp::new();
    let owner = TestUser::new();
    let intruder = TestUser::new();

    let (_, body) = app.post("/products", owner.auth(), product("Private", 5.0, 5, "Tools")).await;
    let uri = format!("/products/{}", body["data"]["_id"].as_str().unwrap());

    let (status, _) = app.get(&uri, intruder.auth()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = app.put(&uri, intruder.auth(), json!({"name": "Mine now"})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = app.delete(&uri, intruder.auth()).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = app.post("/products/get-by-filter", intruder.auth(), json!({})).await;
    assert_eq!(body["totalCount"], 0);

    let (status, body) = app.get(&uri, owner.auth()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Private");
}

#[tokio::test]
async fn malformed_ids_are_not_found() {
    let app = TestApp::new();
    let user = TestUser::new();
    let (status, body) = app.get("/products/not-a-uuid", user.auth()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Product doesn't exist");
}

#[tokio::test]
async fn invalid_create_reports_field_errors() {
    let app = TestApp::new();
    let user = TestUser::new();

    let (status, body) = app.post("/products", user.auth(), product("", -2.0, 1, "Tools")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["name"].is_string());
    assert!(body["field_errors"]["price"].is_string());

    let (status, body) = app.post("/products", user.auth(), json!({"name": "No price"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn duplicate_client_id_conflicts() {
    let app = TestApp::new();
    let user = TestUser::new();
    let mut input = product("Once", 1.0, 1, "Tools");
    input["_id"] = json!(uuid::Uuid::new_v4());

    let (status, _) = app.post("/products", user.auth(), input.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = app.post("/products", user.auth(), input).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn stats_counts_overlapping_bands() {
    let app = TestApp::new();
    let user = TestUser::new();
    for stock in [0, 5, 15] {
        app.post("/products", user.auth(), product("p", 1.0, stock, "Tools")).await;
    }

    let (status, body) = app.get("/products/stats", user.auth()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "stats");
    assert_eq!(
        body["data"],
        json!({"totalProducts": 3, "inStockCount": 2, "lowStockCount": 1, "outOfStockCount": 1})
    );
}
