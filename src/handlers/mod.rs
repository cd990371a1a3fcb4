// Public routes (system) and JWT-protected routes (products, upload)
pub mod products;
pub mod system;
pub mod upload;

use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use crate::error::{ApiError, CatalogError};

/// Unwrap a JSON body, reporting malformed payloads in the API error envelope
pub(crate) fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

pub(crate) fn parse_body<T: DeserializeOwned>(body: Result<Json<Value>, JsonRejection>) -> Result<T, ApiError> {
    serde_json::from_value(json_body(body)?).map_err(|e| ApiError::bad_request(format!("Invalid request body: {}", e)))
}

/// Ids that are not UUIDs cannot name a stored product
pub(crate) fn product_id(raw: &str) -> Result<Uuid, ApiError> {
    raw.parse().map_err(|_| CatalogError::product_not_found().into())
}

/// The `products` array of a bulk request body
pub(crate) fn products_array(body: &Value) -> Result<&[Value], ApiError> {
    body.get("products")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .ok_or_else(|| ApiError::bad_request("Products array is required"))
}
