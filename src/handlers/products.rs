use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde_json::Value;

use crate::app::AppState;
use crate::bulk::{IngestReport, ValidationSummary};
use crate::database::models::Product;
use crate::error::{ApiError, CatalogError};
use crate::filter::FilterSpec;
use crate::handlers::{json_body, parse_body, product_id, products_array};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::types::{CreateProduct, ProductStats, UpdateProduct};

/// POST /products/get-by-filter
pub async fn get_by_filter(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Vec<Product>> {
    let spec: FilterSpec = parse_body(body)?;
    let page = state.products.list(user.user_id, &spec).await?;

    Ok(ApiResponse::message(page.items, "findAll")
        .with_field("totalCount", page.total_count)
        .with_field("currentPage", page.page)
        .with_field("pageSize", page.page_size))
}

/// GET /products/stats
pub async fn stats(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<ProductStats> {
    let stats = state.products.stats(user.user_id).await?;
    Ok(ApiResponse::message(stats, "stats"))
}

/// GET /products/:id
pub async fn get_one(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Product> {
    let product = state.products.get_by_id(product_id(&id)?, user.user_id).await?;
    Ok(ApiResponse::message(product, "findOne"))
}

/// POST /products
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Product> {
    let input: CreateProduct = parse_body(body)?;
    let product = state.products.create(input, user.user_id).await?;
    Ok(ApiResponse::message(product, "created").created())
}

/// PUT /products/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Product> {
    let id = product_id(&id)?;
    let patch: UpdateProduct = parse_body(body)?;
    let product = state.products.update(id, patch, user.user_id).await?;
    Ok(ApiResponse::message(product, "updated"))
}

/// DELETE /products/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Product> {
    let product = state.products.delete(product_id(&id)?, user.user_id).await?;
    Ok(ApiResponse::message(product, "deleted"))
}

/// POST /products/bulk - ingest the valid rows, report the rest
pub async fn bulk_create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let body = json_body(body)?;
    let summary: ValidationSummary = state.validator.summarize(products_array(&body)?)?;

    if summary.valid.is_empty() {
        return Err(ApiError::bad_request(format!("Validation errors: {}", summary.errors.join(", "))));
    }

    let report = state.ingestion.ingest(summary.valid, user.user_id).await?;
    let status = ingest_status(&report)?;
    let inserted = report.inserted();

    Ok(ApiResponse::message(&inserted, format!("Successfully created {} products", inserted.len()))
        .with_status(status)
        .with_field("count", inserted.len())
        .with_field("results", &report.outcomes)
        .with_field("validationErrors", &summary.errors)
        .into_response())
}

/// 201 when every record landed, 207 when some did. When nothing was
/// inserted the legacy error is returned instead.
pub(crate) fn ingest_status(report: &IngestReport) -> Result<StatusCode, ApiError> {
    if report.is_complete() {
        return Ok(StatusCode::CREATED);
    }
    if report.inserted_count() > 0 {
        return Ok(StatusCode::MULTI_STATUS);
    }
    match report.clone().into_strict() {
        Err(e) => Err(e.into()),
        Ok(_) => Err(CatalogError::invalid("Error creating products").into()),
    }
}
