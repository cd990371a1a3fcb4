use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::app::AppState;
use crate::error::ApiError;
use crate::handlers::products::ingest_status;
use crate::handlers::{json_body, products_array};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::types::CreateProduct;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReportBody {
    pub total_products: usize,
    pub valid_products: usize,
    pub invalid_products: usize,
    pub validation_errors: Vec<String>,
    pub products: Vec<CreateProduct>,
}

/// POST /upload/products - the whole batch must validate before anything is written
pub async fn upload_products(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let body = json_body(body)?;
    let summary = state.validator.summarize(products_array(&body)?)?;

    if summary.has_errors() {
        return Err(ApiError::bad_request(format!("Validation errors: {}", summary.errors.join(", "))));
    }

    let report = state.ingestion.ingest(summary.valid, user.user_id).await?;
    let status = ingest_status(&report)?;
    let inserted = report.inserted();

    Ok(ApiResponse::message(&inserted, format!("Successfully uploaded {} products", inserted.len()))
        .with_status(status)
        .with_field("count", inserted.len())
        .with_field("results", &report.outcomes)
        .with_field("success", report.is_complete())
        .into_response())
}

/// POST /upload/products/validate - dry run, nothing is written
pub async fn validate_upload(
    State(state): State<AppState>,
    Extension(_user): Extension<AuthUser>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<ValidationReportBody> {
    let body = json_body(body)?;
    let summary = state.validator.summarize(products_array(&body)?)?;

    let valid = summary.valid.len();
    let success = !summary.has_errors();
    let report = ValidationReportBody {
        total_products: summary.total,
        valid_products: valid,
        invalid_products: summary.errors.len(),
        validation_errors: summary.errors,
        products: summary.valid,
    };

    Ok(ApiResponse::message(report, format!("Validation complete. {} valid products found.", valid))
        .with_field("success", success))
}
