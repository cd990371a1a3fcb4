/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Product fields addressable by filters and sort directives.
/// Used by the filter compiler, the SQL renderer and the in-memory store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProductField {
    Id,
    Name,
    Price,
    Stock,
    Category,
    StockVisible,
    UserId,
    CreatedAt,
    UpdatedAt,
}

impl ProductField {
    /// Column name in the products table
    pub fn column(&self) -> &'static str {
        match self {
            ProductField::Id => "id",
            ProductField::Name => "name",
            ProductField::Price => "price",
            ProductField::Stock => "stock",
            ProductField::Category => "category",
            ProductField::StockVisible => "stock_visible",
            ProductField::UserId => "user_id",
            ProductField::CreatedAt => "created_at",
            ProductField::UpdatedAt => "updated_at",
        }
    }

    /// Resolve a client-supplied sort key. Accepts the camelCase API name or the
    /// snake_case column name. Ownership and identity are not sortable.
    pub fn sortable(name: &str) -> Option<Self> {
        match name.trim() {
            "name" => Some(ProductField::Name),
            "price" => Some(ProductField::Price),
            "stock" => Some(ProductField::Stock),
            "category" => Some(ProductField::Category),
            "stockVisible" | "stock_visible" => Some(ProductField::StockVisible),
            "createdAt" | "created_at" => Some(ProductField::CreatedAt),
            "updatedAt" | "updated_at" => Some(ProductField::UpdatedAt),
            _ => None,
        }
    }
}

/// Payload for creating a single product, and the normalized shape of an
/// accepted bulk candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProduct {
    /// Client-supplied identifier. Re-submitting a known id is what produces a
    /// duplicate-key outcome on insert.
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub name: String,
    pub price: f64,
    pub stock: i64,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_visible: Option<bool>,
}

/// Partial update; only fields that are present are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProduct {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_visible: Option<bool>,
}

impl UpdateProduct {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.stock.is_none()
            && self.category.is_none()
            && self.stock_visible.is_none()
    }
}

/// Per-user inventory counters. `low_stock_count` is a subset of
/// `in_stock_count`, so the four numbers do not partition the total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductStats {
    pub total_products: i64,
    pub in_stock_count: i64,
    pub low_stock_count: i64,
    pub out_of_stock_count: i64,
}

/// Upper bound (inclusive) of the "low stock" band `(0, LOW_STOCK_THRESHOLD]`
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// Loose truthiness used by the lenient request parsers: `null`, `false`, `0`,
/// `NaN` and `""` are falsy, everything else is truthy.
pub fn is_truthy(value: &serde_json::Value) -> bool {
    use serde_json::Value;
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
